//! Profile aggregate
//!
//! Read-only view assembled from users, posts, ratings and AI usage.

use serde::{Deserialize, Serialize};

use super::{Post, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileStats {
    pub post_count: u64,
    /// Sum of the rating counters of the user's active posts
    pub rating_received: i64,
    /// Posts the user currently likes
    pub ratings_given: u64,
    pub ai_usage_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: User,
    pub stats: ProfileStats,
    pub recent_posts: Vec<Post>,
}
