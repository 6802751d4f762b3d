//! Knowledge base port trait

use async_trait::async_trait;

use crate::domain::entities::{DocumentKind, KnowledgeDocument};
use crate::error::KnowledgeBaseError;

/// Store of chatbot context documents (MongoDB)
#[async_trait]
pub trait KnowledgeBaseRepository: Send + Sync {
    /// All documents of a kind, ordered by key
    async fn find_by_kind(
        &self,
        kind: DocumentKind,
    ) -> Result<Vec<KnowledgeDocument>, KnowledgeBaseError>;

    /// A document by its unique key
    async fn find_by_key(&self, key: &str)
        -> Result<Option<KnowledgeDocument>, KnowledgeBaseError>;

    /// Insert or replace the document with the same key
    async fn upsert(
        &self,
        document: &KnowledgeDocument,
    ) -> Result<KnowledgeDocument, KnowledgeBaseError>;
}
