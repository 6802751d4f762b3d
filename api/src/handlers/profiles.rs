//! Profile handlers

use axum::{extract::State, Extension};

use crate::auth::AuthUser;
use crate::domain::entities::Profile;
use crate::error::AppError;
use crate::handlers::envelope::ApiResponse;
use crate::handlers::extract::Path;
use crate::handlers::resolve_actor;
use crate::AppState;

/// GET /api/profiles/me
pub async fn get_my_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ApiResponse<Profile>, AppError> {
    let (user, _) = resolve_actor(&state, &auth).await?;
    let profile = state.profile_service.get_by_id(&user.id).await?;
    Ok(ApiResponse::ok(profile))
}

/// GET /api/profiles/:user_id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<Profile>, AppError> {
    let profile = state.profile_service.get(&user_id).await?;
    Ok(ApiResponse::ok(profile))
}
