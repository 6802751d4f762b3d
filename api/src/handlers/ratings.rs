//! Post rating handlers

use axum::{extract::State, Extension};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::envelope::ApiResponse;
use crate::handlers::extract::Path;
use crate::handlers::resolve_actor;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub post_id: String,
    /// 1 when the caller likes the post, otherwise 0
    pub value: i32,
    /// Post rating counter after the operation, absent on reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_rating: Option<i32>,
}

/// GET /api/posts/:id/rating
pub async fn get_rating(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<RatingResponse>, AppError> {
    let (_, actor) = resolve_actor(&state, &auth).await?;
    let value = state.rating_service.get(&actor, &id).await?;

    Ok(ApiResponse::ok(RatingResponse {
        post_id: id,
        value,
        post_rating: None,
    }))
}

/// POST /api/posts/:id/rating
///
/// Toggle the caller's like on a post.
pub async fn toggle_rating(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<RatingResponse>, AppError> {
    let (_, actor) = resolve_actor(&state, &auth).await?;
    let outcome = state.rating_service.toggle(&actor, &id).await?;

    Ok(ApiResponse::ok(RatingResponse {
        post_id: id,
        value: outcome.value,
        post_rating: Some(outcome.post_rating),
    }))
}
