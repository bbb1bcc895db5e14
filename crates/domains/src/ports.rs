//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired into the binary.
//! Mock implementations are generated by mockall behind the `testing` feature.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Author, Comment, PostDraft, PostView, Session, UserAccount, VoteValue};

/// Storage contract for posts, their comments, and their vote maps.
///
/// Mutations on a single post are serialized by the implementation; every
/// returned [`PostView`] is a consistent snapshot, never a record observed
/// mid-mutation.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    /// Assigns a fresh id and stores the post with empty comments and votes.
    async fn create(&self, author: Author, draft: PostDraft) -> Result<PostView>;

    async fn get(&self, id: Uuid) -> Result<PostView>;

    /// All posts in insertion order.
    async fn list_all(&self) -> Result<Vec<PostView>>;

    async fn list_by_category(&self, category: &str) -> Result<Vec<PostView>>;

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<PostView>>;

    /// Removes the post and all its comments; returns the removed snapshot.
    /// Authorization is the caller's responsibility.
    async fn delete(&self, id: Uuid) -> Result<PostView>;

    /// Bumps the view counter and returns the updated snapshot.
    async fn record_view(&self, id: Uuid) -> Result<PostView>;

    /// Attaches a comment with a repository-assigned id unique within the post.
    async fn add_comment(&self, post_id: Uuid, author: Author, body: &str) -> Result<Comment>;

    /// Removes a comment. Idempotent: an already-absent comment is not an error.
    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<PostView>;

    /// Applies a cast/no-op/flip transition for the user on this post.
    async fn vote(&self, post_id: Uuid, user_id: Uuid, value: VoteValue) -> Result<PostView>;

    /// Applies a retract transition; a missing prior vote is a no-op.
    async fn unvote(&self, post_id: Uuid, user_id: Uuid) -> Result<PostView>;
}

/// Per-user metadata: authored post ids and a read-optimized mirror of the
/// user's outstanding votes. The post's own vote map stays authoritative for
/// aggregates; this mirror only answers "what did I vote" in O(1).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Makes a user known to the directory. Idempotent.
    async fn register_user(&self, user_id: Uuid, login: &str) -> Result<()>;

    /// Read path: an unknown user simply has no posts.
    async fn authored_posts(&self, user_id: Uuid) -> Result<Vec<Uuid>>;

    async fn record_authorship(&self, user_id: Uuid, post_id: Uuid) -> Result<()>;

    async fn forget_authorship(&self, user_id: Uuid, post_id: Uuid) -> Result<()>;

    /// Read path: an unknown user simply has no vote.
    async fn current_vote(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<VoteValue>>;

    /// Write path: sets or clears the mirrored vote. Unknown users are an error.
    async fn mirror_vote(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        value: Option<VoteValue>,
    ) -> Result<()>;
}

/// Session lifecycle: Active → Expired (time) or Active → Revoked (logout),
/// both terminal. A user may hold any number of concurrent sessions.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Generates an unguessable token (≥128 bits of entropy) with a fixed TTL.
    async fn issue(&self, user_id: Uuid, login: &str) -> Result<Session>;

    /// Fails with `Unauthenticated` for unknown tokens or past-expiry sessions.
    /// Expiry is checked lazily here; no background sweep is required.
    async fn validate(&self, token: &str) -> Result<Session>;

    /// Idempotent: revoking an unknown or already-revoked token succeeds.
    async fn revoke(&self, token: &str) -> Result<()>;
}

/// Identity and credential contract. Password hashing is the adapter's
/// concern; the core only sees opaque success or failure.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Fails with `Conflict` when the login is already taken.
    async fn register(&self, login: &str, password: &str) -> Result<UserAccount>;

    /// Fails with `Unauthenticated` on unknown login or wrong password.
    async fn authenticate(&self, login: &str, password: &str) -> Result<UserAccount>;
}

/// Minimal pluggable persistence capability. An in-memory map and a networked
/// store are interchangeable behind this; failures surface as
/// `StorageUnavailable` and are retryable.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Time source, injected so expiry logic is testable with a fake clock.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used by the real wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
