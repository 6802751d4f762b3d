//! MongoDB adapter for KnowledgeBaseRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{DocumentKind, KnowledgeDocument};
use crate::domain::ports::KnowledgeBaseRepository;
use crate::error::KnowledgeBaseError;

pub const COLLECTION: &str = "knowledgebase";

/// Stored shape of a knowledge document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct KnowledgeRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    key: String,
    kind: String,
    title: String,
    content: String,
    updated_at: bson::DateTime,
}

pub struct MongoKnowledgeBaseRepository {
    collection: Collection<KnowledgeRecord>,
}

impl MongoKnowledgeBaseRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION),
        }
    }
}

#[async_trait]
impl KnowledgeBaseRepository for MongoKnowledgeBaseRepository {
    async fn find_by_kind(
        &self,
        kind: DocumentKind,
    ) -> Result<Vec<KnowledgeDocument>, KnowledgeBaseError> {
        let mut cursor = self
            .collection
            .find(doc! { "kind": kind.to_string() })
            .sort(doc! { "key": 1 })
            .await?;

        let mut documents = Vec::new();
        while cursor.advance().await? {
            documents.push(cursor.deserialize_current()?.into());
        }
        Ok(documents)
    }

    async fn find_by_key(
        &self,
        key: &str,
    ) -> Result<Option<KnowledgeDocument>, KnowledgeBaseError> {
        let record = self.collection.find_one(doc! { "key": key }).await?;
        Ok(record.map(Into::into))
    }

    async fn upsert(
        &self,
        document: &KnowledgeDocument,
    ) -> Result<KnowledgeDocument, KnowledgeBaseError> {
        let record = KnowledgeRecord {
            id: None,
            key: document.key.clone(),
            kind: document.kind.to_string(),
            title: document.title.clone(),
            content: document.content.clone(),
            updated_at: bson::DateTime::from_millis(document.updated_at.timestamp_millis()),
        };

        let result = self
            .collection
            .replace_one(doc! { "key": &document.key }, &record)
            .upsert(true)
            .await?;

        let id = result
            .upserted_id
            .and_then(|id| id.as_object_id())
            .map(|oid| oid.to_hex())
            .or_else(|| document.id.clone());

        if id.is_none() {
            // Replaced an existing document without knowing its id
            if let Some(stored) = self.find_by_key(&document.key).await? {
                return Ok(stored);
            }
        }

        Ok(KnowledgeDocument {
            id,
            ..document.clone()
        })
    }
}

impl From<KnowledgeRecord> for KnowledgeDocument {
    fn from(record: KnowledgeRecord) -> Self {
        KnowledgeDocument {
            id: record.id.map(|oid| oid.to_hex()),
            key: record.key,
            kind: record.kind.parse().unwrap_or(DocumentKind::Context),
            title: record.title,
            content: record.content,
            updated_at: DateTime::<Utc>::from_timestamp_millis(record.updated_at.timestamp_millis())
                .unwrap_or_else(Utc::now),
        }
    }
}
