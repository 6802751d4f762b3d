//! User domain entity
//!
//! A board member, created on first authenticated request from the bearer
//! token's subject claim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(UserId)
            .map_err(|_| format!("Invalid user id: {}", s))
    }
}

/// A registered board user
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    /// Subject claim of the identity provider
    #[serde(skip_serializing)]
    pub external_id: String,
    pub email: Option<String>,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Identity data taken from token claims, used to create or refresh a user
#[derive(Debug, Clone)]
pub struct UpsertUser {
    pub external_id: String,
    pub email: Option<String>,
    pub display_name: String,
}

/// A user entry from the organization directory (Microsoft Graph)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    pub display_name: Option<String>,
    pub mail: Option<String>,
    pub user_principal_name: Option<String>,
    pub job_title: Option<String>,
}

/// The authenticated caller of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Actor {
    /// Owners and admins may modify a resource
    pub fn can_modify(&self, owner: &UserId) -> bool {
        self.is_admin || self.user_id == *owner
    }
}
