//! PostgreSQL adapter for PostRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::entities::{
    NewPost, Post, PostId, PostQuery, PostSort, PostUpdate, UserId,
};
use crate::domain::ports::PostRepository;
use crate::entity::posts;
use crate::error::DomainError;

/// PostgreSQL implementation of PostRepository
pub struct PostgresPostRepository {
    db: DatabaseConnection,
}

impl PostgresPostRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        let result = posts::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn list(&self, query: &PostQuery) -> Result<Vec<Post>, DomainError> {
        let mut select = posts::Entity::find().filter(posts::Column::IsActive.eq(true));

        if let Some(user_id) = query.user_id {
            select = select.filter(posts::Column::UserId.eq(user_id.0));
        }

        if let Some(genre) = &query.genre {
            // JSONB containment: genres @> '["horror"]'
            select = select.filter(Expr::cust_with_values(
                "genres @> $1",
                [serde_json::json!([genre])],
            ));
        }

        select = match query.sort {
            PostSort::Newest => select.order_by_desc(posts::Column::CreatedAt),
            PostSort::Top => select
                .order_by_desc(posts::Column::Rating)
                .order_by_desc(posts::Column::CreatedAt),
        };

        let results = select
            .offset(query.offset)
            .limit(query.limit)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn count_by_user(&self, user_id: &UserId) -> Result<u64, DomainError> {
        posts::Entity::find()
            .filter(posts::Column::UserId.eq(user_id.0))
            .filter(posts::Column::IsActive.eq(true))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    async fn sum_rating_by_user(&self, user_id: &UserId) -> Result<i64, DomainError> {
        let total: Option<Option<i64>> = posts::Entity::find()
            .select_only()
            .column_as(posts::Column::Rating.sum(), "total")
            .filter(posts::Column::UserId.eq(user_id.0))
            .filter(posts::Column::IsActive.eq(true))
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(total.flatten().unwrap_or(0))
    }

    async fn create(&self, post: &NewPost) -> Result<Post, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = posts::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(post.user_id.0),
            title: Set(post.title.clone()),
            content: Set(post.content.clone()),
            genres: Set(serde_json::json!(post.genres)),
            rating: Set(0),
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

    async fn update(&self, id: &PostId, update: &PostUpdate) -> Result<Post, DomainError> {
        let mut model = posts::ActiveModel {
            id: Set(id.0),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        };

        if let Some(title) = &update.title {
            model.title = Set(title.clone());
        }
        if let Some(content) = &update.content {
            model.content = Set(content.clone());
        }
        if let Some(genres) = &update.genres {
            model.genres = Set(serde_json::json!(genres));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn set_rating(&self, id: &PostId, rating: i32) -> Result<(), DomainError> {
        posts::ActiveModel {
            id: Set(id.0),
            rating: Set(rating),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }

    async fn deactivate(&self, id: &PostId) -> Result<(), DomainError> {
        posts::ActiveModel {
            id: Set(id.0),
            is_active: Set(false),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl From<posts::Model> for Post {
    fn from(model: posts::Model) -> Self {
        Post {
            id: PostId(model.id),
            user_id: UserId(model.user_id),
            title: model.title,
            content: model.content,
            genres: serde_json::from_value(model.genres).unwrap_or_default(),
            rating: model.rating,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
