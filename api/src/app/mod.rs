//! Application layer
//!
//! Business services for the bulletin board. Services are generic over the
//! port traits they use and hold them as `Arc`s.

pub mod ai_prompts;
pub mod ai_service;
pub mod bulletin_service;
pub mod cache_service;
pub mod configuration_service;
pub mod post_rating_service;
pub mod post_service;
pub mod profile_service;
pub mod user_service;

pub use ai_prompts::ModerationVerdict;
pub use ai_service::{AiService, AiUsageSummary, ChatReply};
pub use bulletin_service::BulletinService;
pub use cache_service::CacheService;
pub use configuration_service::{ConfigurationService, PublicConfiguration};
pub use post_rating_service::PostRatingService;
pub use post_service::PostService;
pub use profile_service::ProfileService;
pub use user_service::UserService;
