//! Post rating service
//!
//! A rating is a per-user like toggle. Each post keeps a denormalized rating
//! counter that moves by one on every toggle and never drops below zero.

use std::sync::Arc;

use crate::app::cache_service::{keys, CacheService};
use crate::app::post_service::parse_post_id;
use crate::domain::entities::{
    apply_rating_delta, Actor, NewPostRating, Post, PostId, RatingOutcome,
};
use crate::domain::ports::{PostRatingRepository, PostRepository};
use crate::error::AppError;

/// Service for rating posts
pub struct PostRatingService<PR, RR>
where
    PR: PostRepository,
    RR: PostRatingRepository,
{
    posts: Arc<PR>,
    ratings: Arc<RR>,
    cache: Arc<CacheService>,
}

impl<PR, RR> PostRatingService<PR, RR>
where
    PR: PostRepository,
    RR: PostRatingRepository,
{
    pub fn new(posts: Arc<PR>, ratings: Arc<RR>, cache: Arc<CacheService>) -> Self {
        Self {
            posts,
            ratings,
            cache,
        }
    }

    /// Toggle the caller's rating on a post
    ///
    /// - no record yet: create one with value 1 and increment the counter
    /// - value 1: set 0 and decrement the counter (floored at zero)
    /// - value 0: set 1 and increment the counter
    pub async fn toggle(&self, actor: &Actor, post_id: &str) -> Result<RatingOutcome, AppError> {
        let post_id = parse_post_id(post_id)?;
        let post = self.active_post(&post_id).await?;

        let (value, delta) = match self.ratings.find(&post_id, &actor.user_id).await? {
            None => {
                let rating = self
                    .ratings
                    .create(&NewPostRating {
                        post_id,
                        user_id: actor.user_id,
                        value: 1,
                    })
                    .await
                    .inspect_err(|e| {
                        tracing::error!(error = %e, post_id = %post_id, "Failed to create rating")
                    })?;
                (rating.value, 1)
            }
            Some(mut rating) => {
                let delta = rating.toggle();
                self.ratings
                    .set_value(&rating.id, rating.value)
                    .await
                    .inspect_err(|e| {
                        tracing::error!(error = %e, rating_id = %rating.id, "Failed to update rating")
                    })?;
                (rating.value, delta)
            }
        };

        let post_rating = apply_rating_delta(post.rating, delta);
        self.posts.set_rating(&post_id, post_rating).await?;

        // Author's received total and the caller's given count both changed
        self.cache.invalidate(&keys::profile(&post.user_id)).await;
        self.cache.invalidate(&keys::profile(&actor.user_id)).await;

        tracing::debug!(post_id = %post_id, user_id = %actor.user_id, value, post_rating, "Rating toggled");

        Ok(RatingOutcome { value, post_rating })
    }

    /// The caller's current rating value on a post, 0 when never rated
    pub async fn get(&self, actor: &Actor, post_id: &str) -> Result<i32, AppError> {
        let post_id = parse_post_id(post_id)?;
        self.active_post(&post_id).await?;

        Ok(self
            .ratings
            .find(&post_id, &actor.user_id)
            .await?
            .map_or(0, |r| r.value))
    }

    async fn active_post(&self, id: &PostId) -> Result<Post, AppError> {
        self.posts
            .find_by_id(id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))
    }
}
