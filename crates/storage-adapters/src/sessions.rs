//! In-memory [`SessionStore`]. Tokens are 32 bytes from the OS entropy
//! source, hex-encoded, so guessing one is infeasible. Expiry is enforced
//! lazily on validation; `purge_expired` exists as an optional sweep for
//! long-running deployments.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use dashmap::DashMap;
use tracing::warn;
use uuid::Uuid;

use domains::{AppError, Clock, KeyValueStore, Result, Session, SessionStore};

const TOKEN_BYTES: usize = 32;

pub struct MemorySessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    journal: Option<Arc<dyn KeyValueStore>>,
}

impl MemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            clock,
            journal: None,
        }
    }

    /// Same store, journaling sessions into `journal` under
    /// `session:<token>` keys.
    pub fn with_journal(
        clock: Arc<dyn Clock>,
        ttl: Duration,
        journal: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            journal: Some(journal),
            ..Self::new(clock, ttl)
        }
    }

    fn generate_token() -> Result<String> {
        let mut bytes = [0u8; TOKEN_BYTES];
        getrandom::getrandom(&mut bytes)
            .map_err(|err| AppError::Internal(format!("entropy source failed: {err}")))?;
        Ok(hex::encode(bytes))
    }

    fn journal_key(token: &str) -> String {
        format!("session:{token}")
    }

    async fn journal_put(&self, session: &Session) {
        let Some(journal) = &self.journal else { return };
        match serde_json::to_vec(session) {
            Ok(bytes) => {
                if let Err(err) = journal.set(&Self::journal_key(&session.token), bytes).await {
                    warn!(%err, "session journal write failed");
                }
            }
            Err(err) => warn!(%err, "session journal encode failed"),
        }
    }

    async fn journal_delete(&self, token: &str) {
        let Some(journal) = &self.journal else { return };
        if let Err(err) = journal.delete(&Self::journal_key(token)).await {
            warn!(%err, "session journal delete failed");
        }
    }

    /// Drops every session past its expiry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|s| now >= s.expires)
            .map(|s| s.token.clone())
            .collect();
        for token in &expired {
            self.sessions.remove(token);
            self.journal_delete(token).await;
        }
        expired.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn issue(&self, user_id: Uuid, login: &str) -> Result<Session> {
        let now = self.clock.now();
        let session = Session {
            token: Self::generate_token()?,
            user_id,
            login: login.to_string(),
            created: now,
            expires: now + self.ttl,
        };
        self.sessions.insert(session.token.clone(), session.clone());

        self.journal_put(&session).await;
        Ok(session)
    }

    async fn validate(&self, token: &str) -> Result<Session> {
        let session = {
            let entry = self
                .sessions
                .get(token)
                .ok_or_else(|| AppError::Unauthenticated("unknown session token".into()))?;
            entry.clone()
        };

        if self.clock.now() >= session.expires {
            // lazily expire: terminal transition, same as a revoke
            self.sessions.remove(token);
            self.journal_delete(token).await;
            return Err(AppError::Unauthenticated("session expired".into()));
        }
        Ok(session)
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        self.sessions.remove(token);
        self.journal_delete(token).await;
        Ok(())
    }
}
