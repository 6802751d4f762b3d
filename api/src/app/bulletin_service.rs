//! Bulletin service
//!
//! Serves the "about us" page stored in the knowledge base.

use std::sync::Arc;

use chrono::Utc;

use crate::app::cache_service::{keys, CacheService};
use crate::domain::entities::{
    validate_content, validate_title, Actor, DocumentKind, KnowledgeDocument, ABOUT_US_KEY,
};
use crate::domain::ports::KnowledgeBaseRepository;
use crate::error::AppError;

pub struct BulletinService<KB>
where
    KB: KnowledgeBaseRepository,
{
    knowledge: Arc<KB>,
    cache: Arc<CacheService>,
}

impl<KB> BulletinService<KB>
where
    KB: KnowledgeBaseRepository,
{
    pub fn new(knowledge: Arc<KB>, cache: Arc<CacheService>) -> Self {
        Self { knowledge, cache }
    }

    /// The about-us document, 404 when it was never written
    pub async fn about_us(&self) -> Result<KnowledgeDocument, AppError> {
        if let Some(doc) = self.cache.get::<KnowledgeDocument>(keys::ABOUT_US).await {
            return Ok(doc);
        }

        let doc = self
            .knowledge
            .find_by_key(ABOUT_US_KEY)
            .await?
            .ok_or_else(|| AppError::NotFound("About us page not found".to_string()))?;

        self.cache.insert(keys::ABOUT_US, doc.clone()).await;
        Ok(doc)
    }

    /// Replace the about-us document (admin only)
    pub async fn update_about_us(
        &self,
        actor: &Actor,
        title: &str,
        content: &str,
    ) -> Result<KnowledgeDocument, AppError> {
        if !actor.is_admin {
            return Err(AppError::Forbidden);
        }

        let title = validate_title(title).map_err(AppError::BadRequest)?;
        let content = validate_content(content).map_err(AppError::BadRequest)?;

        let doc = self
            .knowledge
            .upsert(&KnowledgeDocument {
                id: None,
                key: ABOUT_US_KEY.to_string(),
                kind: DocumentKind::AboutUs,
                title,
                content,
                updated_at: Utc::now(),
            })
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to save about us page"))?;

        self.cache.invalidate(keys::ABOUT_US).await;
        tracing::info!(by = %actor.user_id, "About us page updated");
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::test_utils::{test_actor, test_admin, test_document, test_user, InMemoryKnowledgeBase};

    fn create_service(
        knowledge: InMemoryKnowledgeBase,
    ) -> (
        BulletinService<InMemoryKnowledgeBase>,
        Arc<InMemoryKnowledgeBase>,
    ) {
        let knowledge = Arc::new(knowledge);
        let cache = Arc::new(CacheService::new(Duration::from_secs(60), 100));
        (BulletinService::new(knowledge.clone(), cache), knowledge)
    }

    #[tokio::test]
    async fn about_us_missing_is_not_found() {
        let (service, _) = create_service(InMemoryKnowledgeBase::new());
        assert!(matches!(
            service.about_us().await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn about_us_is_cached() {
        let (service, knowledge) = create_service(InMemoryKnowledgeBase::new().with_document(
            test_document(DocumentKind::AboutUs, ABOUT_US_KEY, "We like stories."),
        ));

        assert_eq!(service.about_us().await.unwrap().content, "We like stories.");
        assert_eq!(service.about_us().await.unwrap().content, "We like stories.");
        assert_eq!(knowledge.reads(), 1);
    }

    #[tokio::test]
    async fn update_requires_admin_and_invalidates_cache() {
        let (service, _) = create_service(InMemoryKnowledgeBase::new().with_document(
            test_document(DocumentKind::AboutUs, ABOUT_US_KEY, "Old text"),
        ));
        service.about_us().await.unwrap();

        let result = service
            .update_about_us(&test_actor(&test_user()), "About", "Hacked")
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));

        let saved = service
            .update_about_us(&test_admin(), "About IBBS", "New text")
            .await
            .unwrap();
        assert!(saved.id.is_some());
        assert_eq!(saved.kind, DocumentKind::AboutUs);

        let current = service.about_us().await.unwrap();
        assert_eq!(current.title, "About IBBS");
        assert_eq!(current.content, "New text");
    }
}
