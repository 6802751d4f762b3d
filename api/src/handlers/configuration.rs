//! Configuration and cache administration handlers

use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};

use crate::app::PublicConfiguration;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::envelope::ApiResponse;
use crate::handlers::extract::Query;
use crate::AppState;

/// GET /api/configuration
pub async fn get_configuration(State(state): State<AppState>) -> ApiResponse<PublicConfiguration> {
    ApiResponse::ok(state.configuration_service.get())
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearCacheQuery {
    /// Only drop keys in this namespace, e.g. `profile:` or `ai:tags:`
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CacheClearedResponse {
    pub cleared: u64,
}

/// DELETE /api/cache?prefix=
///
/// Admin only. Drops every cached entry, or only those under `prefix`.
pub async fn clear_cache(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ClearCacheQuery>,
) -> Result<ApiResponse<CacheClearedResponse>, AppError> {
    if !auth.is_admin {
        return Err(AppError::Forbidden);
    }

    let cleared = match query.prefix.as_deref().map(str::trim) {
        Some(prefix) if !prefix.is_empty() => state.cache.invalidate_prefix(prefix).await,
        _ => {
            let count = state.cache.entry_count().await;
            state.cache.clear().await;
            count
        }
    };
    tracing::info!(by = %auth.subject, cleared, "Cache cleared by admin");

    Ok(ApiResponse::ok(CacheClearedResponse { cleared }))
}
