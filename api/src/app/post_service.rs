//! Post service
//!
//! Create, read, list, update and soft delete posts. New posts can be run
//! through AI moderation before they are stored.

use std::sync::Arc;

use crate::app::ai_prompts::{moderation_messages, parse_moderation};
use crate::app::cache_service::{keys, CacheService};
use crate::domain::entities::{
    normalize_genres, validate_content, validate_title, Actor, NewPost, Post, PostId, PostQuery,
    PostSort, PostUpdate, UserId,
};
use crate::domain::ports::{AiClient, PostRepository};
use crate::error::{AiError, AppError, DomainError};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Clamp a requested page size to 1..=MAX_PAGE_SIZE
pub fn page_size(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Parse a post id from a path segment, rejecting malformed GUIDs with 400
pub fn parse_post_id(id: &str) -> Result<PostId, AppError> {
    id.parse::<PostId>()
        .map_err(|e| AppError::Domain(DomainError::Validation(e)))
}

pub fn parse_user_id(id: &str) -> Result<UserId, AppError> {
    id.parse::<UserId>()
        .map_err(|e| AppError::Domain(DomainError::Validation(e)))
}

/// Service for managing posts
pub struct PostService<PR, AC>
where
    PR: PostRepository,
    AC: AiClient + ?Sized,
{
    posts: Arc<PR>,
    /// Set when new posts must pass moderation
    moderator: Option<Arc<AC>>,
    cache: Arc<CacheService>,
}

impl<PR, AC> PostService<PR, AC>
where
    PR: PostRepository,
    AC: AiClient + ?Sized,
{
    pub fn new(posts: Arc<PR>, moderator: Option<Arc<AC>>, cache: Arc<CacheService>) -> Self {
        Self {
            posts,
            moderator,
            cache,
        }
    }

    pub fn moderation_enabled(&self) -> bool {
        self.moderator.is_some()
    }

    /// Create a post owned by the caller
    pub async fn create(
        &self,
        actor: &Actor,
        title: &str,
        content: &str,
        genres: &[String],
    ) -> Result<Post, AppError> {
        let title = validate_title(title).map_err(AppError::BadRequest)?;
        let content = validate_content(content).map_err(AppError::BadRequest)?;
        let genres = normalize_genres(genres).map_err(AppError::BadRequest)?;

        if let Some(ref moderator) = self.moderator {
            let text = format!("{}\n\n{}", title, content);
            let completion = moderator
                .complete(&moderation_messages(&text))
                .await
                .inspect_err(|e| tracing::error!(error = %e, "Moderation request failed"))?;
            let verdict = parse_moderation(&completion.content).map_err(AiError::InvalidResponse)?;

            if verdict.flagged {
                tracing::warn!(
                    user_id = %actor.user_id,
                    categories = ?verdict.categories,
                    "Post rejected by moderation"
                );
                let reason = verdict
                    .reason
                    .unwrap_or_else(|| verdict.categories.join(", "));
                return Err(AppError::BadRequest(format!(
                    "Post rejected by moderation: {}",
                    reason
                )));
            }
        }

        let new_post = NewPost {
            user_id: actor.user_id,
            title,
            content,
            genres,
        };

        let post = self
            .posts
            .create(&new_post)
            .await
            .inspect_err(|e| tracing::error!(error = %e, user_id = %actor.user_id, "Failed to create post"))?;

        self.cache.invalidate(&keys::profile(&post.user_id)).await;
        tracing::info!(post_id = %post.id, user_id = %post.user_id, "Post created");

        Ok(post)
    }

    /// Get an active post; malformed ids are a 400, missing or deleted posts a 404
    pub async fn get(&self, id: &str) -> Result<Post, AppError> {
        let id = parse_post_id(id)?;
        self.get_active(&id).await
    }

    pub(crate) async fn get_active(&self, id: &PostId) -> Result<Post, AppError> {
        self.posts
            .find_by_id(id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))
    }

    /// List active posts
    pub async fn list(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
        genre: Option<&str>,
        sort: PostSort,
    ) -> Result<Vec<Post>, AppError> {
        let genre = genre
            .map(|g| g.trim().trim_start_matches('#').to_lowercase())
            .filter(|g| !g.is_empty());

        let query = PostQuery {
            user_id: None,
            genre,
            sort,
            limit: page_size(limit),
            offset: offset.unwrap_or(0),
        };

        Ok(self.posts.list(&query).await?)
    }

    /// List a user's active posts, newest first
    pub async fn list_by_user(
        &self,
        user_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Vec<Post>, AppError> {
        let user_id = parse_user_id(user_id)?;
        let query = PostQuery {
            user_id: Some(user_id),
            genre: None,
            sort: PostSort::Newest,
            limit: page_size(limit),
            offset: offset.unwrap_or(0),
        };

        Ok(self.posts.list(&query).await?)
    }

    /// Update a post; only the owner may edit
    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        title: Option<&str>,
        content: Option<&str>,
        genres: Option<&[String]>,
    ) -> Result<Post, AppError> {
        let id = parse_post_id(id)?;
        let post = self.get_active(&id).await?;

        if !post.is_owned_by(&actor.user_id) {
            return Err(AppError::Forbidden);
        }

        let update = PostUpdate {
            title: title
                .map(validate_title)
                .transpose()
                .map_err(AppError::BadRequest)?,
            content: content
                .map(validate_content)
                .transpose()
                .map_err(AppError::BadRequest)?,
            genres: genres
                .map(normalize_genres::<String>)
                .transpose()
                .map_err(AppError::BadRequest)?,
        };

        if update.is_empty() {
            return Err(AppError::BadRequest("Nothing to update".to_string()));
        }

        let updated = self
            .posts
            .update(&id, &update)
            .await
            .inspect_err(|e| tracing::error!(error = %e, post_id = %id, "Failed to update post"))?;

        self.cache.invalidate(&keys::profile(&updated.user_id)).await;
        Ok(updated)
    }

    /// Soft delete a post; the owner or an admin may delete
    pub async fn delete(&self, actor: &Actor, id: &str) -> Result<(), AppError> {
        let id = parse_post_id(id)?;
        let post = self.get_active(&id).await?;

        if !actor.can_modify(&post.user_id) {
            return Err(AppError::Forbidden);
        }

        self.posts
            .deactivate(&id)
            .await
            .inspect_err(|e| tracing::error!(error = %e, post_id = %id, "Failed to delete post"))?;

        // Likers' profiles count this post too
        self.cache.invalidate_prefix(keys::PROFILE_PREFIX).await;
        tracing::info!(post_id = %id, by = %actor.user_id, "Post deleted");
        Ok(())
    }
}
