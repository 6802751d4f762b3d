//! MongoDB adapters

pub mod knowledge_repo;

pub use knowledge_repo::MongoKnowledgeBaseRepository;
