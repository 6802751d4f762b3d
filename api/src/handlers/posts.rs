//! Post handlers
//!
//! Endpoints for browsing and managing posts.

use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::domain::entities::{Post, PostSort};
use crate::error::AppError;
use crate::handlers::envelope::ApiResponse;
use crate::handlers::extract::{Json, Path, Query};
use crate::handlers::resolve_actor;
use crate::AppState;

/// Query parameters for listing posts
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub genre: Option<String>,
    /// `newest` (default) or `top`
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Fields left out are not changed
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub genres: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub genres: Vec<String>,
    pub rating: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            user_id: post.user_id.to_string(),
            title: post.title,
            content: post.content,
            genres: post.genres,
            rating: post.rating,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }
}

fn to_responses(posts: Vec<Post>) -> Vec<PostResponse> {
    posts.into_iter().map(PostResponse::from).collect()
}

/// GET /api/posts
///
/// List active posts, newest first or by rating.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<ApiResponse<Vec<PostResponse>>, AppError> {
    let sort: PostSort = query
        .sort
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(AppError::BadRequest)?;

    let posts = state
        .post_service
        .list(query.limit, query.offset, query.genre.as_deref(), sort)
        .await?;

    Ok(ApiResponse::ok(to_responses(posts)))
}

/// GET /api/posts/:id
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<PostResponse>, AppError> {
    let post = state.post_service.get(&id).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// GET /api/posts/user/:user_id
pub async fn list_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<ApiResponse<Vec<PostResponse>>, AppError> {
    let posts = state
        .post_service
        .list_by_user(&user_id, query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(to_responses(posts)))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreatePostRequest>,
) -> Result<ApiResponse<PostResponse>, AppError> {
    let (_, actor) = resolve_actor(&state, &auth).await?;

    let post = state
        .post_service
        .create(&actor, &req.title, &req.content, &req.genres)
        .await?;

    Ok(ApiResponse::created(post.into()))
}

/// PUT /api/posts/:id
///
/// Only the author can edit a post.
pub async fn update_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<ApiResponse<PostResponse>, AppError> {
    let (_, actor) = resolve_actor(&state, &auth).await?;

    let post = state
        .post_service
        .update(
            &actor,
            &id,
            req.title.as_deref(),
            req.content.as_deref(),
            req.genres.as_deref(),
        )
        .await?;

    Ok(ApiResponse::ok(post.into()))
}

/// DELETE /api/posts/:id
///
/// Soft delete by the author or an admin.
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<bool>, AppError> {
    let (_, actor) = resolve_actor(&state, &auth).await?;
    state.post_service.delete(&actor, &id).await?;
    Ok(ApiResponse::ok(true))
}
