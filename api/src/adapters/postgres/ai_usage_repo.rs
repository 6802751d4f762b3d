//! PostgreSQL adapter for AiUsageRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::domain::entities::{AiFeature, AiUsage, AiUsageId, NewAiUsage, UserId};
use crate::domain::ports::AiUsageRepository;
use crate::entity::ai_usages;
use crate::error::DomainError;

/// PostgreSQL implementation of AiUsageRepository
pub struct PostgresAiUsageRepository {
    db: DatabaseConnection,
}

impl PostgresAiUsageRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AiUsageRepository for PostgresAiUsageRepository {
    async fn record(&self, usage: &NewAiUsage) -> Result<AiUsage, DomainError> {
        let model = ai_usages::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(usage.user_id.0),
            feature: Set(usage.feature.to_string()),
            prompt_tokens: Set(usage.prompt_tokens),
            completion_tokens: Set(usage.completion_tokens),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn count_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        ai_usages::Entity::find()
            .filter(ai_usages::Column::UserId.eq(user_id.0))
            .filter(ai_usages::Column::CreatedAt.gte(since.fixed_offset()))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    async fn count_by_user(&self, user_id: &UserId) -> Result<u64, DomainError> {
        ai_usages::Entity::find()
            .filter(ai_usages::Column::UserId.eq(user_id.0))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

/// Convert SeaORM model to domain entity
impl From<ai_usages::Model> for AiUsage {
    fn from(model: ai_usages::Model) -> Self {
        AiUsage {
            id: AiUsageId(model.id),
            user_id: UserId(model.user_id),
            feature: model.feature.parse().unwrap_or(AiFeature::Chat),
            prompt_tokens: model.prompt_tokens,
            completion_tokens: model.completion_tokens,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
