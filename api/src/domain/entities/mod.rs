//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod ai_usage;
pub mod knowledge;
pub mod post;
pub mod post_rating;
pub mod profile;
pub mod user;

pub use ai_usage::{AiFeature, AiUsage, AiUsageId, NewAiUsage};
pub use knowledge::{render_context, DocumentKind, KnowledgeDocument, ABOUT_US_KEY};
pub use post::{
    normalize_genres, validate_content, validate_title, NewPost, Post, PostId, PostQuery,
    PostSort, PostUpdate, MAX_CONTENT_LEN, MAX_GENRES, MAX_TITLE_LEN,
};
pub use post_rating::{apply_rating_delta, NewPostRating, PostRating, PostRatingId, RatingOutcome};
pub use profile::{Profile, ProfileStats};
pub use user::{Actor, DirectoryUser, UpsertUser, User, UserId};
