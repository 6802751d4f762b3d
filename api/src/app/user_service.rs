//! User service
//!
//! Local user records keyed by the identity provider subject, plus lookups
//! against the organization directory.

use std::sync::Arc;

use crate::app::cache_service::{keys, CacheService};
use crate::app::post_service::parse_user_id;
use crate::domain::entities::{Actor, DirectoryUser, UpsertUser, User};
use crate::domain::ports::{UserDirectory, UserRepository};
use crate::error::{AppError, DomainError};

pub const MIN_SEARCH_LEN: usize = 2;
pub const DIRECTORY_SEARCH_LIMIT: u32 = 25;

pub struct UserService<UR, UD>
where
    UR: UserRepository,
    UD: UserDirectory + ?Sized,
{
    users: Arc<UR>,
    directory: Arc<UD>,
    cache: Arc<CacheService>,
}

impl<UR, UD> UserService<UR, UD>
where
    UR: UserRepository,
    UD: UserDirectory + ?Sized,
{
    pub fn new(users: Arc<UR>, directory: Arc<UD>, cache: Arc<CacheService>) -> Self {
        Self {
            users,
            directory,
            cache,
        }
    }

    /// Create or refresh the local record for an authenticated caller
    ///
    /// Gate for every authenticated operation: deactivated accounts get 403.
    pub async fn ensure_user(&self, identity: &UpsertUser) -> Result<User, AppError> {
        if identity.external_id.trim().is_empty() {
            return Err(AppError::Unauthorized);
        }

        let user = self
            .users
            .upsert(identity)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, external_id = %identity.external_id, "Failed to upsert user")
            })?;

        if !user.is_active {
            tracing::warn!(user_id = %user.id, "Deactivated user attempted access");
            return Err(AppError::Domain(DomainError::Forbidden(
                "User account is deactivated".to_string(),
            )));
        }

        Ok(user)
    }

    /// Get an active user by path id
    pub async fn get(&self, id: &str) -> Result<User, AppError> {
        let id = parse_user_id(id)?;
        self.users
            .find_by_id(&id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Soft delete a user (admin only)
    pub async fn deactivate(&self, actor: &Actor, id: &str) -> Result<(), AppError> {
        if !actor.is_admin {
            return Err(AppError::Forbidden);
        }

        let user = self.get(id).await?;
        self.users
            .deactivate(&user.id)
            .await
            .inspect_err(|e| tracing::error!(error = %e, user_id = %user.id, "Failed to deactivate user"))?;

        self.cache.invalidate(&keys::profile(&user.id)).await;
        tracing::info!(user_id = %user.id, by = %actor.user_id, "User deactivated");
        Ok(())
    }

    /// Search the organization directory by display name or mail prefix
    pub async fn search_directory(&self, query: &str) -> Result<Vec<DirectoryUser>, AppError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Err(AppError::BadRequest(format!(
                "Search query must be at least {} characters",
                MIN_SEARCH_LEN
            )));
        }

        Ok(self
            .directory
            .search_users(query, DIRECTORY_SEARCH_LIMIT)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Directory search failed"))?)
    }
}
