//! In-memory [`UserDirectory`]: one DashMap entry per user, so operations on
//! distinct users never contend. The vote mirror kept here is a derived
//! index — the post's own vote map stays authoritative for aggregates, and
//! this structure can always be rebuilt from the post collection.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use domains::{AppError, Result, UserDirectory, VoteValue};

#[derive(Debug, Default)]
struct UserRecord {
    login: String,
    authored: HashSet<Uuid>,
    votes: HashMap<Uuid, VoteValue>,
}

#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: DashMap<Uuid, UserRecord>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn register_user(&self, user_id: Uuid, login: &str) -> Result<()> {
        self.users
            .entry(user_id)
            .or_insert_with(|| UserRecord { login: login.to_string(), ..Default::default() });
        Ok(())
    }

    async fn authored_posts(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        // unknown user reads as "no posts"
        let mut ids: Vec<Uuid> = self
            .users
            .get(&user_id)
            .map(|r| r.authored.iter().copied().collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }

    async fn record_authorship(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        let mut record = self
            .users
            .get_mut(&user_id)
            .ok_or(AppError::UnknownUser(user_id))?;
        record.authored.insert(post_id);
        Ok(())
    }

    async fn forget_authorship(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        let mut record = self
            .users
            .get_mut(&user_id)
            .ok_or(AppError::UnknownUser(user_id))?;
        record.authored.remove(&post_id);
        Ok(())
    }

    async fn current_vote(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<VoteValue>> {
        // unknown user reads as "no vote"
        Ok(self
            .users
            .get(&user_id)
            .and_then(|r| r.votes.get(&post_id).copied()))
    }

    async fn mirror_vote(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        value: Option<VoteValue>,
    ) -> Result<()> {
        let mut record = self
            .users
            .get_mut(&user_id)
            .ok_or(AppError::UnknownUser(user_id))?;
        match value {
            Some(v) => {
                record.votes.insert(post_id, v);
            }
            None => {
                record.votes.remove(&post_id);
            }
        }
        Ok(())
    }
}
