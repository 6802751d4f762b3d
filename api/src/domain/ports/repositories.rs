//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{
    AiUsage, NewAiUsage, NewPost, NewPostRating, Post, PostId, PostQuery, PostRating,
    PostRatingId, PostUpdate, UpsertUser, User, UserId,
};
use crate::error::DomainError;

/// Repository for Post entities
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a post by ID, active or not
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, DomainError>;

    /// List active posts matching the query
    async fn list(&self, query: &PostQuery) -> Result<Vec<Post>, DomainError>;

    /// Count a user's active posts
    async fn count_by_user(&self, user_id: &UserId) -> Result<u64, DomainError>;

    /// Sum the rating counters of a user's active posts
    async fn sum_rating_by_user(&self, user_id: &UserId) -> Result<i64, DomainError>;

    /// Create a new post
    async fn create(&self, post: &NewPost) -> Result<Post, DomainError>;

    /// Apply a partial update and return the updated post
    async fn update(&self, id: &PostId, update: &PostUpdate) -> Result<Post, DomainError>;

    /// Overwrite the denormalized rating counter
    async fn set_rating(&self, id: &PostId, rating: i32) -> Result<(), DomainError>;

    /// Soft delete
    async fn deactivate(&self, id: &PostId) -> Result<(), DomainError>;
}

/// Repository for PostRating entities
#[async_trait]
pub trait PostRatingRepository: Send + Sync {
    /// Find the rating record of a user on a post
    async fn find(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<Option<PostRating>, DomainError>;

    /// Create a rating record
    async fn create(&self, rating: &NewPostRating) -> Result<PostRating, DomainError>;

    /// Update the value of a rating record
    async fn set_value(&self, id: &PostRatingId, value: i32) -> Result<(), DomainError>;

    /// Count active posts currently liked by a user
    async fn count_liked_by_user(&self, user_id: &UserId) -> Result<u64, DomainError>;
}

/// Repository for User entities
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Create the user or refresh its email, display name and last seen timestamp
    async fn upsert(&self, user: &UpsertUser) -> Result<User, DomainError>;

    /// Soft delete
    async fn deactivate(&self, id: &UserId) -> Result<(), DomainError>;
}

/// Repository for AI usage records
#[async_trait]
pub trait AiUsageRepository: Send + Sync {
    /// Record an AI call
    async fn record(&self, usage: &NewAiUsage) -> Result<AiUsage, DomainError>;

    /// Count a user's calls since a point in time
    async fn count_since(&self, user_id: &UserId, since: DateTime<Utc>)
        -> Result<u64, DomainError>;

    /// Count all of a user's calls
    async fn count_by_user(&self, user_id: &UserId) -> Result<u64, DomainError>;
}

/// Executes validated read-only SQL produced by the chatbot
#[async_trait]
pub trait QueryRunner: Send + Sync {
    /// Run a single SELECT and return at most `max_rows` rows as JSON objects
    async fn run_select(
        &self,
        sql: &str,
        max_rows: usize,
    ) -> Result<Vec<serde_json::Value>, DomainError>;
}
