//! Profile service
//!
//! Aggregates a user's posts, ratings and AI usage into a profile. Profiles
//! are cached and invalidated by the services that change their inputs.

use std::sync::Arc;

use crate::app::cache_service::{keys, CacheService};
use crate::app::post_service::parse_user_id;
use crate::domain::entities::{PostQuery, PostSort, Profile, ProfileStats, UserId};
use crate::domain::ports::{AiUsageRepository, PostRatingRepository, PostRepository, UserRepository};
use crate::error::AppError;

pub const RECENT_POSTS: u64 = 5;

pub struct ProfileService<UR, PR, RR, AU>
where
    UR: UserRepository,
    PR: PostRepository,
    RR: PostRatingRepository,
    AU: AiUsageRepository,
{
    users: Arc<UR>,
    posts: Arc<PR>,
    ratings: Arc<RR>,
    usages: Arc<AU>,
    cache: Arc<CacheService>,
}

impl<UR, PR, RR, AU> ProfileService<UR, PR, RR, AU>
where
    UR: UserRepository,
    PR: PostRepository,
    RR: PostRatingRepository,
    AU: AiUsageRepository,
{
    pub fn new(
        users: Arc<UR>,
        posts: Arc<PR>,
        ratings: Arc<RR>,
        usages: Arc<AU>,
        cache: Arc<CacheService>,
    ) -> Self {
        Self {
            users,
            posts,
            ratings,
            usages,
            cache,
        }
    }

    /// Profile of a user by path id
    pub async fn get(&self, user_id: &str) -> Result<Profile, AppError> {
        let user_id = parse_user_id(user_id)?;
        self.get_by_id(&user_id).await
    }

    /// Profile of a known user id, served from cache when possible
    pub async fn get_by_id(&self, user_id: &UserId) -> Result<Profile, AppError> {
        self.cache
            .get_or_try_insert_with(&keys::profile(user_id), || self.build(user_id))
            .await
    }

    async fn build(&self, user_id: &UserId) -> Result<Profile, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let post_count = self.posts.count_by_user(user_id).await?;
        let rating_received = self.posts.sum_rating_by_user(user_id).await?;
        let ratings_given = self.ratings.count_liked_by_user(user_id).await?;
        let ai_usage_count = self.usages.count_by_user(user_id).await?;

        let recent_posts = self
            .posts
            .list(&PostQuery {
                user_id: Some(*user_id),
                genre: None,
                sort: PostSort::Newest,
                limit: RECENT_POSTS,
                offset: 0,
            })
            .await?;

        tracing::debug!(user_id = %user_id, post_count, "Profile built");

        Ok(Profile {
            user,
            stats: ProfileStats {
                post_count,
                rating_received,
                ratings_given,
                ai_usage_count,
            },
            recent_posts,
        })
    }
}
