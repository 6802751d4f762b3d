//! SeaORM entities
//!
//! Table definitions matching `migrations/0001_init.sql`.

pub mod ai_usages;
pub mod post_ratings;
pub mod posts;
pub mod users;
