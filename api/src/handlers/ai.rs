//! AI helper handlers
//!
//! Rewriting, tagging, moderation and the chatbot. All calls count against
//! the caller's daily limit.

use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};

use crate::app::{AiUsageSummary, ChatReply, ModerationVerdict};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::envelope::ApiResponse;
use crate::handlers::extract::Json;
use crate::handlers::resolve_actor;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    pub content: String,
    pub style: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RewriteResponse {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// POST /api/ai/rewrite
pub async fn rewrite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<RewriteRequest>,
) -> Result<ApiResponse<RewriteResponse>, AppError> {
    let (user, _) = resolve_actor(&state, &auth).await?;
    let content = state
        .ai_service
        .rewrite(&user.id, &req.content, req.style.as_deref())
        .await?;

    Ok(ApiResponse::ok(RewriteResponse { content }))
}

/// POST /api/ai/tag
pub async fn tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<ContentRequest>,
) -> Result<ApiResponse<TagResponse>, AppError> {
    let (user, _) = resolve_actor(&state, &auth).await?;
    let genres = state.ai_service.tag(&user.id, &req.content).await?;
    Ok(ApiResponse::ok(TagResponse { genres }))
}

/// POST /api/ai/moderate
pub async fn moderate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<ContentRequest>,
) -> Result<ApiResponse<ModerationVerdict>, AppError> {
    let (user, _) = resolve_actor(&state, &auth).await?;
    let verdict = state.ai_service.moderate(&user.id, &req.content).await?;
    Ok(ApiResponse::ok(verdict))
}

/// POST /api/ai/chat
pub async fn chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<ChatRequest>,
) -> Result<ApiResponse<ChatReply>, AppError> {
    let (user, _) = resolve_actor(&state, &auth).await?;
    let reply = state.ai_service.chat(&user.id, &req.message).await?;
    Ok(ApiResponse::ok(reply))
}

/// GET /api/ai/usage
pub async fn usage(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ApiResponse<AiUsageSummary>, AppError> {
    let (user, _) = resolve_actor(&state, &auth).await?;
    let summary = state.ai_service.usage(&user.id).await?;
    Ok(ApiResponse::ok(summary))
}
