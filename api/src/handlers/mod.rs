//! HTTP handlers
//!
//! Axum request handlers for the API endpoints. Every response is wrapped in
//! the `envelope::ApiResponse` envelope.

pub mod ai;
pub mod bulletin;
pub mod configuration;
pub mod envelope;
pub mod extract;
pub mod posts;
pub mod profiles;
pub mod ratings;
pub mod users;

pub use bulletin::{get_about_us, update_about_us};
pub use configuration::{clear_cache, get_configuration};
pub use posts::{create_post, delete_post, get_post, list_posts, list_user_posts, update_post};
pub use profiles::{get_my_profile, get_profile};
pub use ratings::{get_rating, toggle_rating};
pub use users::{deactivate_user, get_me, get_user, search_users};

use crate::auth::AuthUser;
use crate::domain::entities::{Actor, User};
use crate::error::AppError;
use crate::AppState;

/// Upsert the caller's local record and build the actor used for permission checks
pub(crate) async fn resolve_actor(
    state: &AppState,
    auth: &AuthUser,
) -> Result<(User, Actor), AppError> {
    let user = state.user_service.ensure_user(&auth.to_upsert()).await?;
    let actor = Actor {
        user_id: user.id,
        is_admin: auth.is_admin,
    };
    Ok((user, actor))
}
