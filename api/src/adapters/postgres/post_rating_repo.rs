//! PostgreSQL adapter for PostRatingRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::domain::entities::{
    NewPostRating, PostId, PostRating, PostRatingId, UserId,
};
use crate::domain::ports::PostRatingRepository;
use crate::entity::{post_ratings, posts};
use crate::error::DomainError;

/// PostgreSQL implementation of PostRatingRepository
pub struct PostgresPostRatingRepository {
    db: DatabaseConnection,
}

impl PostgresPostRatingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRatingRepository for PostgresPostRatingRepository {
    async fn find(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<Option<PostRating>, DomainError> {
        let result = post_ratings::Entity::find()
            .filter(post_ratings::Column::PostId.eq(post_id.0))
            .filter(post_ratings::Column::UserId.eq(user_id.0))
            .filter(post_ratings::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn create(&self, rating: &NewPostRating) -> Result<PostRating, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = post_ratings::ActiveModel {
            id: Set(Uuid::new_v4()),
            post_id: Set(rating.post_id.0),
            user_id: Set(rating.user_id.0),
            value: Set(rating.value),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn set_value(&self, id: &PostRatingId, value: i32) -> Result<(), DomainError> {
        post_ratings::ActiveModel {
            id: Set(id.0),
            value: Set(value),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }

    /// Likes on posts that are still visible
    async fn count_liked_by_user(&self, user_id: &UserId) -> Result<u64, DomainError> {
        post_ratings::Entity::find()
            .inner_join(posts::Entity)
            .filter(posts::Column::IsActive.eq(true))
            .filter(post_ratings::Column::UserId.eq(user_id.0))
            .filter(post_ratings::Column::Value.eq(1))
            .filter(post_ratings::Column::IsActive.eq(true))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

/// Convert SeaORM model to domain entity
impl From<post_ratings::Model> for PostRating {
    fn from(model: post_ratings::Model) -> Self {
        PostRating {
            id: PostRatingId(model.id),
            post_id: PostId(model.post_id),
            user_id: UserId(model.user_id),
            value: model.value,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
