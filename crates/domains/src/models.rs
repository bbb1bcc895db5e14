//! # Domain Models
//!
//! Core entities of the Ferrit content service. Posts carry their own vote
//! ledger; the wire-facing [`PostView`] flattens the internal maps into the
//! vectors the public JSON shape expects.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::ledger::VoteTally;

/// A single vote value. "No vote" is always `Option::None`, never a zero —
/// a zero on the wire is a validation error, not a retraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    pub fn as_i64(self) -> i64 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = AppError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            other => Err(AppError::Validation(format!(
                "vote value must be 1 or -1, got {other}"
            ))),
        }
    }
}

impl From<VoteValue> for i64 {
    fn from(value: VoteValue) -> Self {
        value.as_i64()
    }
}

/// Who wrote a post or comment: stable user id plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
}

/// Text posts carry a body, link posts a URL. Flattened into the parent
/// object as `type` + `text`/`url` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PostContent {
    Text { text: String },
    Link { url: String },
}

/// A comment, owned exclusively by its parent post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author: Author,
    pub body: String,
    pub created: DateTime<Utc>,
}

/// Input for creating a post. The author is supplied separately from the
/// acting session, never from the draft itself.
#[derive(Debug, Clone, Deserialize)]
pub struct PostDraft {
    pub category: String,
    pub title: String,
    #[serde(flatten)]
    pub content: PostContent,
}

impl PostDraft {
    /// Rejects drafts missing the fields the repository requires.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".into()));
        }
        if self.category.trim().is_empty() {
            return Err(AppError::Validation("category must not be empty".into()));
        }
        match &self.content {
            PostContent::Text { text } if text.trim().is_empty() => {
                Err(AppError::Validation("text must not be empty".into()))
            }
            PostContent::Link { url } if url.trim().is_empty() => {
                Err(AppError::Validation("url must not be empty".into()))
            }
            _ => Ok(()),
        }
    }
}

/// Internal post record as the repository stores it. Comments and votes are
/// maps for O(1) mutation; `tally` caches the aggregates the ledger maintains.
/// Serializable so a key-value journal can persist whole records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    /// Repository-assigned insertion sequence; drives deterministic listing order.
    pub seq: u64,
    pub author: Author,
    pub category: String,
    pub title: String,
    pub content: PostContent,
    pub created: DateTime<Utc>,
    pub views: u64,
    pub comments: HashMap<Uuid, Comment>,
    pub votes: HashMap<Uuid, VoteValue>,
    pub tally: VoteTally,
}

impl Post {
    /// Consistent wire-facing snapshot of this record.
    pub fn view(&self) -> PostView {
        let mut comments: Vec<Comment> = self.comments.values().cloned().collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));

        let mut votes: Vec<Vote> = self
            .votes
            .iter()
            .map(|(user, vote)| Vote { user: *user, vote: *vote })
            .collect();
        votes.sort_by(|a, b| a.user.cmp(&b.user));

        PostView {
            id: self.id,
            author: self.author.clone(),
            category: self.category.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            created: self.created,
            score: self.tally.score,
            upvote_percentage: self.tally.percentage(),
            views: self.views,
            comments,
            votes,
        }
    }
}

/// A (user, value) pair as exposed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub user: Uuid,
    pub vote: VoteValue,
}

/// The serialization-facing shape of a post: maps flattened to vectors,
/// aggregates exposed, internal bookkeeping (seq, upvote count) hidden.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub author: Author,
    pub category: String,
    pub title: String,
    #[serde(flatten)]
    pub content: PostContent,
    pub created: DateTime<Utc>,
    pub score: i64,
    pub upvote_percentage: u8,
    pub views: u64,
    pub comments: Vec<Comment>,
    pub votes: Vec<Vote>,
}

impl PostView {
    /// The user's current vote on this post, if any.
    pub fn vote_of(&self, user_id: Uuid) -> Option<VoteValue> {
        self.votes.iter().find(|v| v.user == user_id).map(|v| v.vote)
    }
}

/// A registered identity as the credential verifier reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub login: String,
}

/// An issued session. The token is an opaque credential; it reaches clients
/// only via the transport layer (cookie or bearer header), never as a
/// persistent response field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub login: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl Session {
    pub fn author(&self) -> Author {
        Author {
            id: self.user_id,
            username: self.login.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_value_rejects_zero_and_out_of_range() {
        assert!(VoteValue::try_from(0).is_err());
        assert!(VoteValue::try_from(2).is_err());
        assert_eq!(VoteValue::try_from(1).unwrap(), VoteValue::Up);
        assert_eq!(VoteValue::try_from(-1).unwrap(), VoteValue::Down);
    }

    #[test]
    fn vote_value_wire_format_is_signed_integer() {
        let json = serde_json::to_string(&VoteValue::Down).unwrap();
        assert_eq!(json, "-1");
        let back: VoteValue = serde_json::from_str("1").unwrap();
        assert_eq!(back, VoteValue::Up);
        assert!(serde_json::from_str::<VoteValue>("0").is_err());
    }

    #[test]
    fn post_content_flattens_into_type_and_payload() {
        let draft: PostDraft = serde_json::from_str(
            r#"{"category":"music","title":"hi","type":"link","url":"https://example.com"}"#,
        )
        .unwrap();
        assert_eq!(
            draft.content,
            PostContent::Link { url: "https://example.com".into() }
        );
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn draft_validation_catches_missing_fields() {
        let draft = PostDraft {
            category: "".into(),
            title: "ok".into(),
            content: PostContent::Text { text: "body".into() },
        };
        assert!(draft.validate().is_err());

        let draft = PostDraft {
            category: "news".into(),
            title: "  ".into(),
            content: PostContent::Text { text: "body".into() },
        };
        assert!(draft.validate().is_err());
    }
}
