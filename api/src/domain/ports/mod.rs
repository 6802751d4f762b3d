//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod ai;
pub mod directory;
pub mod knowledge;
pub mod repositories;

pub use ai::{AiClient, AiCompletion, ChatMessage, ChatRole};
pub use directory::UserDirectory;
pub use knowledge::KnowledgeBaseRepository;
pub use repositories::{
    AiUsageRepository, PostRatingRepository, PostRepository, QueryRunner, UserRepository,
};
