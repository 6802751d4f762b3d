//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod ai;
pub mod graph;
pub mod mongo;
pub mod postgres;

pub use ai::{DisabledAiClient, OpenAiCompatibleClient};
pub use graph::{DisabledDirectory, GraphDirectoryClient};
pub use mongo::MongoKnowledgeBaseRepository;
pub use postgres::{
    PostgresAiUsageRepository, PostgresPostRatingRepository, PostgresPostRepository,
    PostgresQueryRunner, PostgresUserRepository,
};
