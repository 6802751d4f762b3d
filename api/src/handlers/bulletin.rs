//! Bulletin handlers

use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::domain::entities::KnowledgeDocument;
use crate::error::AppError;
use crate::handlers::envelope::ApiResponse;
use crate::handlers::extract::Json;
use crate::handlers::resolve_actor;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateAboutUsRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct AboutUsResponse {
    pub title: String,
    pub content: String,
    pub updated_at: String,
}

impl From<KnowledgeDocument> for AboutUsResponse {
    fn from(doc: KnowledgeDocument) -> Self {
        Self {
            title: doc.title,
            content: doc.content,
            updated_at: doc.updated_at.to_rfc3339(),
        }
    }
}

/// GET /api/bulletin/about-us
pub async fn get_about_us(
    State(state): State<AppState>,
) -> Result<ApiResponse<AboutUsResponse>, AppError> {
    let doc = state.bulletin_service.about_us().await?;
    Ok(ApiResponse::ok(doc.into()))
}

/// PUT /api/bulletin/about-us
///
/// Admin only.
pub async fn update_about_us(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<UpdateAboutUsRequest>,
) -> Result<ApiResponse<AboutUsResponse>, AppError> {
    let (_, actor) = resolve_actor(&state, &auth).await?;
    let doc = state
        .bulletin_service
        .update_about_us(&actor, &req.title, &req.content)
        .await?;
    Ok(ApiResponse::ok(doc.into()))
}
