//! User directory port trait
//!
//! Organization directory lookups (Microsoft Graph).

use async_trait::async_trait;

use crate::domain::entities::DirectoryUser;
use crate::error::DirectoryError;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Users whose display name or mail starts with `query`
    async fn search_users(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<DirectoryUser>, DirectoryError>;

    /// A single directory user by object id
    async fn get_user(&self, id: &str) -> Result<Option<DirectoryUser>, DirectoryError>;
}
