//! In-memory [`PostRepo`] built on a DashMap keyed by post id.
//!
//! Exclusion discipline: mutating one post locks only that post's shard entry,
//! so writers on different posts never contend and two writers on the same
//! post are serialized. Whole-map iteration (listing) only clones snapshots
//! and holds no lock while the result is assembled into order.
//!
//! An optional key-value journal receives a serialized snapshot after every
//! mutation. Journal writes happen strictly after all map guards are dropped,
//! so lock hold time never depends on backend latency; failures are logged
//! and the in-memory state remains the source of truth (best-effort
//! persistence, per the repository's documented consistency model).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::warn;
use uuid::Uuid;

use domains::{
    AppError, Author, Clock, Comment, KeyValueStore, Post, PostDraft, PostRepo, PostView, Result,
    VoteTally, VoteValue,
};

pub struct MemoryPostRepo {
    posts: DashMap<Uuid, Post>,
    seq: AtomicU64,
    clock: Arc<dyn Clock>,
    journal: Option<Arc<dyn KeyValueStore>>,
}

impl MemoryPostRepo {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            posts: DashMap::new(),
            seq: AtomicU64::new(0),
            clock,
            journal: None,
        }
    }

    /// Same repository, journaling every mutation into `journal` under
    /// `post:<id>` keys.
    pub fn with_journal(clock: Arc<dyn Clock>, journal: Arc<dyn KeyValueStore>) -> Self {
        Self {
            journal: Some(journal),
            ..Self::new(clock)
        }
    }

    fn journal_key(id: Uuid) -> String {
        format!("post:{id}")
    }

    /// Best-effort write-behind. Called only after map guards are dropped.
    async fn journal_put(&self, post: &Post) {
        let Some(journal) = &self.journal else { return };
        match serde_json::to_vec(post) {
            Ok(bytes) => {
                if let Err(err) = journal.set(&Self::journal_key(post.id), bytes).await {
                    warn!(post_id = %post.id, %err, "post journal write failed");
                }
            }
            Err(err) => warn!(post_id = %post.id, %err, "post journal encode failed"),
        }
    }

    async fn journal_delete(&self, id: Uuid) {
        let Some(journal) = &self.journal else { return };
        if let Err(err) = journal.delete(&Self::journal_key(id)).await {
            warn!(post_id = %id, %err, "post journal delete failed");
        }
    }

    /// Snapshots in insertion order. The per-item shard lock is released as
    /// soon as each clone is taken.
    fn snapshot_where(&self, keep: impl Fn(&Post) -> bool) -> Vec<PostView> {
        let mut snapshots: Vec<(u64, PostView)> = self
            .posts
            .iter()
            .filter(|p| keep(p.value()))
            .map(|p| (p.seq, p.view()))
            .collect();
        snapshots.sort_by_key(|(seq, _)| *seq);
        snapshots.into_iter().map(|(_, view)| view).collect()
    }
}

#[async_trait]
impl PostRepo for MemoryPostRepo {
    async fn create(&self, author: Author, draft: PostDraft) -> Result<PostView> {
        draft.validate()?;
        if author.username.trim().is_empty() {
            return Err(AppError::Validation("author username must not be empty".into()));
        }

        let post = Post {
            id: Uuid::now_v7(),
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            author,
            category: draft.category,
            title: draft.title,
            content: draft.content,
            created: self.clock.now(),
            views: 0,
            comments: HashMap::new(),
            votes: HashMap::new(),
            tally: VoteTally::default(),
        };
        let view = post.view();
        self.posts.insert(post.id, post.clone());

        self.journal_put(&post).await;
        Ok(view)
    }

    async fn get(&self, id: Uuid) -> Result<PostView> {
        self.posts
            .get(&id)
            .map(|p| p.view())
            .ok_or_else(|| AppError::post_not_found(id))
    }

    async fn list_all(&self) -> Result<Vec<PostView>> {
        Ok(self.snapshot_where(|_| true))
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<PostView>> {
        Ok(self.snapshot_where(|p| p.category == category))
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<PostView>> {
        Ok(self.snapshot_where(|p| p.author.id == author_id))
    }

    async fn delete(&self, id: Uuid) -> Result<PostView> {
        let (_, removed) = self
            .posts
            .remove(&id)
            .ok_or_else(|| AppError::post_not_found(id))?;

        self.journal_delete(id).await;
        Ok(removed.view())
    }

    async fn record_view(&self, id: Uuid) -> Result<PostView> {
        let (view, record) = {
            let mut entry = self
                .posts
                .get_mut(&id)
                .ok_or_else(|| AppError::post_not_found(id))?;
            entry.views += 1;
            (entry.view(), entry.clone())
        };

        self.journal_put(&record).await;
        Ok(view)
    }

    async fn add_comment(&self, post_id: Uuid, author: Author, body: &str) -> Result<Comment> {
        if body.trim().is_empty() {
            return Err(AppError::Validation("comment body must not be empty".into()));
        }

        let (comment, record) = {
            let mut entry = self
                .posts
                .get_mut(&post_id)
                .ok_or_else(|| AppError::post_not_found(post_id))?;
            let comment = Comment {
                id: Uuid::now_v7(),
                author,
                body: body.to_string(),
                created: self.clock.now(),
            };
            entry.comments.insert(comment.id, comment.clone());
            (comment, entry.clone())
        };

        self.journal_put(&record).await;
        Ok(comment)
    }

    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<PostView> {
        let (view, record) = {
            let mut entry = self
                .posts
                .get_mut(&post_id)
                .ok_or_else(|| AppError::post_not_found(post_id))?;
            // idempotent: removing an absent comment is a no-op
            entry.comments.remove(&comment_id);
            (entry.view(), entry.clone())
        };

        self.journal_put(&record).await;
        Ok(view)
    }

    async fn vote(&self, post_id: Uuid, user_id: Uuid, value: VoteValue) -> Result<PostView> {
        let (view, record) = {
            let mut entry = self
                .posts
                .get_mut(&post_id)
                .ok_or_else(|| AppError::post_not_found(post_id))?;
            let prior = entry.votes.get(&user_id).copied();
            if entry.tally.apply(prior, value) {
                entry.votes.insert(user_id, value);
            }
            debug_assert_eq!(entry.tally.total as usize, entry.votes.len());
            (entry.view(), entry.clone())
        };

        self.journal_put(&record).await;
        Ok(view)
    }

    async fn unvote(&self, post_id: Uuid, user_id: Uuid) -> Result<PostView> {
        let (view, record) = {
            let mut entry = self
                .posts
                .get_mut(&post_id)
                .ok_or_else(|| AppError::post_not_found(post_id))?;
            let prior = entry.votes.get(&user_id).copied();
            if entry.tally.remove(prior) {
                entry.votes.remove(&user_id);
            }
            debug_assert_eq!(entry.tally.total as usize, entry.votes.len());
            (entry.view(), entry.clone())
        };

        self.journal_put(&record).await;
        Ok(view)
    }
}
