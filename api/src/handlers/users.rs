//! User handlers
//!
//! Local user records and organization directory search.

use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::domain::entities::{DirectoryUser, User};
use crate::error::AppError;
use crate::handlers::envelope::ApiResponse;
use crate::handlers::extract::{Path, Query};
use crate::handlers::resolve_actor;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: Option<String>,
    pub display_name: String,
    pub created_at: String,
    pub last_seen_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            display_name: user.display_name,
            created_at: user.created_at.to_rfc3339(),
            last_seen_at: user.last_seen_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Caller's own record, including roles from the token
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub roles: Vec<String>,
    pub is_admin: bool,
}

/// GET /api/users/me
///
/// Creates the local user on first call.
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ApiResponse<MeResponse>, AppError> {
    let (user, actor) = resolve_actor(&state, &auth).await?;

    Ok(ApiResponse::ok(MeResponse {
        user: user.into(),
        roles: auth.roles,
        is_admin: actor.is_admin,
    }))
}

/// GET /api/users/search?q=
pub async fn search_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> Result<ApiResponse<Vec<DirectoryUser>>, AppError> {
    resolve_actor(&state, &auth).await?;
    let users = state.user_service.search_directory(&query.q).await?;
    Ok(ApiResponse::ok(users))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    resolve_actor(&state, &auth).await?;
    let user = state.user_service.get(&id).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// DELETE /api/users/:id
///
/// Admin only.
pub async fn deactivate_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<bool>, AppError> {
    let (_, actor) = resolve_actor(&state, &auth).await?;
    state.user_service.deactivate(&actor, &id).await?;
    Ok(ApiResponse::ok(true))
}
