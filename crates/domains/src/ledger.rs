//! # Vote Ledger
//!
//! Pure arithmetic over a post's aggregate vote counters. Exactly four
//! transitions exist: cast, no-op, flip, retract. The tally is the single
//! authority for `score`/`upvotes`; the percentage is always derived, never
//! stored independently.

use serde::{Deserialize, Serialize};

use crate::models::VoteValue;

/// Aggregate counters for one post. Invariants:
/// `score == sum of vote values`, `upvotes == count of +1 votes`,
/// `total == number of votes`. Counters saturate rather than underflow;
/// an underflow would be a programming error upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub score: i64,
    pub upvotes: u64,
    pub total: u64,
}

impl VoteTally {
    /// A user with no prior vote casts one.
    pub fn cast(&mut self, vote: VoteValue) {
        self.score += vote.as_i64();
        self.total += 1;
        if vote == VoteValue::Up {
            self.upvotes += 1;
        }
    }

    /// A user switches direction without retracting first. The score moves
    /// two steps; the vote count stays put.
    pub fn flip(&mut self, to: VoteValue) {
        self.score += 2 * to.as_i64();
        match to {
            VoteValue::Up => self.upvotes += 1,
            VoteValue::Down => self.upvotes = self.upvotes.saturating_sub(1),
        }
    }

    /// A user removes their vote entirely.
    pub fn retract(&mut self, prior: VoteValue) {
        self.score -= prior.as_i64();
        self.total = self.total.saturating_sub(1);
        if prior == VoteValue::Up {
            self.upvotes = self.upvotes.saturating_sub(1);
        }
    }

    /// Dispatches a vote request onto cast / no-op / flip.
    /// Returns `false` when the request was an idempotent no-op.
    pub fn apply(&mut self, prior: Option<VoteValue>, new: VoteValue) -> bool {
        match prior {
            None => {
                self.cast(new);
                true
            }
            Some(p) if p == new => false,
            Some(_) => {
                self.flip(new);
                true
            }
        }
    }

    /// Dispatches an un-vote request onto retract / no-op.
    pub fn remove(&mut self, prior: Option<VoteValue>) -> bool {
        match prior {
            Some(p) => {
                self.retract(p);
                true
            }
            None => false,
        }
    }

    /// Share of cast votes that are upvotes, rounded to the nearest integer.
    /// 0 when no votes exist; clamped to [0, 100] against corrupted counters.
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = (100 * self.upvotes + self.total / 2) / self.total;
        pct.min(100) as u8
    }
}
