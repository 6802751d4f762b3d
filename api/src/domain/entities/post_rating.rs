//! Post rating domain entity
//!
//! A per-user like/unlike toggle on a post. The value is 1 (liked) or
//! 0 (not liked); the post keeps a denormalized counter of likes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PostId, UserId};

/// Unique identifier for a rating record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostRatingId(pub Uuid);

impl PostRatingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PostRatingId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PostRatingId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PostRatingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user's rating of a post
#[derive(Debug, Clone, Serialize)]
pub struct PostRating {
    pub id: PostRatingId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub value: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostRating {
    pub fn is_liked(&self) -> bool {
        self.value == 1
    }

    /// Flip the value between 0 and 1, returning the counter delta
    pub fn toggle(&mut self) -> i32 {
        if self.is_liked() {
            self.value = 0;
            -1
        } else {
            self.value = 1;
            1
        }
    }
}

/// Data needed to create a rating record
#[derive(Debug, Clone)]
pub struct NewPostRating {
    pub post_id: PostId,
    pub user_id: UserId,
    pub value: i32,
}

/// Outcome of a rating toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RatingOutcome {
    /// The caller's rating after the toggle (0 or 1)
    pub value: i32,
    /// The post's rating counter after the toggle
    pub post_rating: i32,
}

/// Apply a counter delta, never going below zero
pub fn apply_rating_delta(current: i32, delta: i32) -> i32 {
    current.saturating_add(delta).max(0)
}
