//! PostgreSQL adapter for UserRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use crate::domain::entities::{UpsertUser, User, UserId};
use crate::domain::ports::UserRepository;
use crate::entity::users;
use crate::error::DomainError;

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    /// Single `INSERT .. ON CONFLICT (external_id) DO UPDATE`, so concurrent
    /// first logins of the same subject converge on one row. `is_active` is
    /// never touched on conflict.
    async fn upsert(&self, user: &UpsertUser) -> Result<User, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            external_id: Set(user.external_id.clone()),
            email: Set(user.email.clone()),
            display_name: Set(user.display_name.clone()),
            is_active: Set(true),
            created_at: Set(now),
            last_seen_at: Set(Some(now)),
        };

        let result = users::Entity::insert(model)
            .on_conflict(
                OnConflict::column(users::Column::ExternalId)
                    .update_columns([
                        users::Column::Email,
                        users::Column::DisplayName,
                        users::Column::LastSeenAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn deactivate(&self, id: &UserId) -> Result<(), DomainError> {
        users::ActiveModel {
            id: Set(id.0),
            is_active: Set(false),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        User {
            id: UserId(model.id),
            external_id: model.external_id,
            email: model.email,
            display_name: model.display_name,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            last_seen_at: model.last_seen_at.map(|t| t.with_timezone(&Utc)),
        }
    }
}
