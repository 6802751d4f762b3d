//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod ai_usage_repo;
pub mod post_rating_repo;
pub mod post_repo;
pub mod query_runner;
pub mod user_repo;


pub use ai_usage_repo::PostgresAiUsageRepository;
pub use post_rating_repo::PostgresPostRatingRepository;
pub use post_repo::PostgresPostRepository;
pub use query_runner::PostgresQueryRunner;
pub use user_repo::PostgresUserRepository;
