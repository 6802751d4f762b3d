//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

use crate::domain::entities::{
    AiUsage, AiUsageId, DirectoryUser, DocumentKind, KnowledgeDocument, NewAiUsage, NewPost,
    NewPostRating, Post, PostId, PostQuery, PostRating, PostRatingId, PostSort, PostUpdate,
    UpsertUser, User, UserId,
};
use crate::domain::ports::{
    AiClient, AiCompletion, AiUsageRepository, ChatMessage, KnowledgeBaseRepository,
    PostRatingRepository, PostRepository, QueryRunner, UserDirectory, UserRepository,
};
use crate::error::{AiError, DirectoryError, DomainError, KnowledgeBaseError};

// ============================================================================
// In-Memory Post Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: Arc<RwLock<HashMap<PostId, Post>>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a post for testing
    pub fn with_post(self, post: Post) -> Self {
        self.posts.write().unwrap().insert(post.id, post);
        self
    }

    /// Read a post back regardless of its active flag
    pub fn get(&self, id: &PostId) -> Option<Post> {
        self.posts.read().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        Ok(self.posts.read().unwrap().get(id).cloned())
    }

    async fn list(&self, query: &PostQuery) -> Result<Vec<Post>, DomainError> {
        let posts = self.posts.read().unwrap();
        let mut result: Vec<Post> = posts
            .values()
            .filter(|p| p.is_active)
            .filter(|p| query.user_id.map_or(true, |u| p.user_id == u))
            .filter(|p| {
                query
                    .genre
                    .as_ref()
                    .map_or(true, |g| p.genres.iter().any(|pg| pg == g))
            })
            .cloned()
            .collect();

        match query.sort {
            PostSort::Newest => result.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            PostSort::Top => result.sort_by(|a, b| {
                b.rating
                    .cmp(&a.rating)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
        }

        Ok(result
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn count_by_user(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let posts = self.posts.read().unwrap();
        Ok(posts
            .values()
            .filter(|p| p.is_active && p.user_id == *user_id)
            .count() as u64)
    }

    async fn sum_rating_by_user(&self, user_id: &UserId) -> Result<i64, DomainError> {
        let posts = self.posts.read().unwrap();
        Ok(posts
            .values()
            .filter(|p| p.is_active && p.user_id == *user_id)
            .map(|p| p.rating as i64)
            .sum())
    }

    async fn create(&self, new_post: &NewPost) -> Result<Post, DomainError> {
        let now = Utc::now();
        let post = Post {
            id: PostId::new(),
            user_id: new_post.user_id,
            title: new_post.title.clone(),
            content: new_post.content.clone(),
            genres: new_post.genres.clone(),
            rating: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.posts.write().unwrap().insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: &PostId, update: &PostUpdate) -> Result<Post, DomainError> {
        let mut posts = self.posts.write().unwrap();
        let post = posts
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Post {} not found", id)))?;

        if let Some(ref title) = update.title {
            post.title = title.clone();
        }
        if let Some(ref content) = update.content {
            post.content = content.clone();
        }
        if let Some(ref genres) = update.genres {
            post.genres = genres.clone();
        }
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn set_rating(&self, id: &PostId, rating: i32) -> Result<(), DomainError> {
        let mut posts = self.posts.write().unwrap();
        let post = posts
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Post {} not found", id)))?;
        post.rating = rating;
        Ok(())
    }

    async fn deactivate(&self, id: &PostId) -> Result<(), DomainError> {
        let mut posts = self.posts.write().unwrap();
        let post = posts
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Post {} not found", id)))?;
        post.is_active = false;
        Ok(())
    }
}

// ============================================================================
// In-Memory Post Rating Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryPostRatingRepository {
    ratings: Arc<RwLock<HashMap<PostRatingId, PostRating>>>,
    /// When set, likes on missing or deleted posts are not counted
    posts: Option<Arc<InMemoryPostRepository>>,
}

impl InMemoryPostRatingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rating(self, rating: PostRating) -> Self {
        self.ratings.write().unwrap().insert(rating.id, rating);
        self
    }

    pub fn with_posts(mut self, posts: Arc<InMemoryPostRepository>) -> Self {
        self.posts = Some(posts);
        self
    }

    /// Number of stored rating records
    pub fn len(&self) -> usize {
        self.ratings.read().unwrap().len()
    }
}

#[async_trait]
impl PostRatingRepository for InMemoryPostRatingRepository {
    async fn find(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<Option<PostRating>, DomainError> {
        let ratings = self.ratings.read().unwrap();
        Ok(ratings
            .values()
            .find(|r| r.post_id == *post_id && r.user_id == *user_id)
            .cloned())
    }

    async fn create(&self, new_rating: &NewPostRating) -> Result<PostRating, DomainError> {
        let mut ratings = self.ratings.write().unwrap();
        if ratings
            .values()
            .any(|r| r.post_id == new_rating.post_id && r.user_id == new_rating.user_id)
        {
            return Err(DomainError::AlreadyExists(
                "Rating already exists for this post and user".to_string(),
            ));
        }

        let now = Utc::now();
        let rating = PostRating {
            id: PostRatingId::new(),
            post_id: new_rating.post_id,
            user_id: new_rating.user_id,
            value: new_rating.value,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        ratings.insert(rating.id, rating.clone());
        Ok(rating)
    }

    async fn set_value(&self, id: &PostRatingId, value: i32) -> Result<(), DomainError> {
        let mut ratings = self.ratings.write().unwrap();
        let rating = ratings
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("Rating {} not found", id)))?;
        rating.value = value;
        rating.updated_at = Utc::now();
        Ok(())
    }

    async fn count_liked_by_user(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let ratings = self.ratings.read().unwrap();
        Ok(ratings
            .values()
            .filter(|r| r.is_active && r.user_id == *user_id && r.value == 1)
            .filter(|r| match self.posts {
                Some(ref posts) => posts.get(&r.post_id).is_some_and(|p| p.is_active),
                None => true,
            })
            .count() as u64)
    }
}

// ============================================================================
// In-Memory User Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.users.write().unwrap().insert(user.id, user);
        self
    }

    pub fn len(&self) -> usize {
        self.users.read().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().unwrap().get(id).cloned())
    }

    async fn upsert(&self, upsert: &UpsertUser) -> Result<User, DomainError> {
        let mut users = self.users.write().unwrap();
        let now = Utc::now();

        if let Some(user) = users
            .values_mut()
            .find(|u| u.external_id == upsert.external_id)
        {
            user.email = upsert.email.clone();
            user.display_name = upsert.display_name.clone();
            user.last_seen_at = Some(now);
            return Ok(user.clone());
        }

        let user = User {
            id: UserId::new(),
            external_id: upsert.external_id.clone(),
            email: upsert.email.clone(),
            display_name: upsert.display_name.clone(),
            is_active: true,
            created_at: now,
            last_seen_at: Some(now),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn deactivate(&self, id: &UserId) -> Result<(), DomainError> {
        let mut users = self.users.write().unwrap();
        let user = users
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("User {} not found", id)))?;
        user.is_active = false;
        Ok(())
    }
}

// ============================================================================
// In-Memory AI Usage Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryAiUsageRepository {
    usages: Arc<RwLock<Vec<AiUsage>>>,
}

impl InMemoryAiUsageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with `count` usages recorded at `at`
    pub fn with_usages(self, user_id: UserId, count: usize, at: DateTime<Utc>) -> Self {
        {
            let mut usages = self.usages.write().unwrap();
            for _ in 0..count {
                usages.push(AiUsage {
                    id: AiUsageId(uuid::Uuid::new_v4()),
                    user_id,
                    feature: crate::domain::entities::AiFeature::Chat,
                    prompt_tokens: 10,
                    completion_tokens: 10,
                    created_at: at,
                });
            }
        }
        self
    }

    pub fn records(&self) -> Vec<AiUsage> {
        self.usages.read().unwrap().clone()
    }
}

#[async_trait]
impl AiUsageRepository for InMemoryAiUsageRepository {
    async fn record(&self, usage: &NewAiUsage) -> Result<AiUsage, DomainError> {
        let record = AiUsage {
            id: AiUsageId(uuid::Uuid::new_v4()),
            user_id: usage.user_id,
            feature: usage.feature,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            created_at: Utc::now(),
        };
        self.usages.write().unwrap().push(record.clone());
        Ok(record)
    }

    async fn count_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let usages = self.usages.read().unwrap();
        Ok(usages
            .iter()
            .filter(|u| u.user_id == *user_id && u.created_at >= since)
            .count() as u64)
    }

    async fn count_by_user(&self, user_id: &UserId) -> Result<u64, DomainError> {
        let usages = self.usages.read().unwrap();
        Ok(usages.iter().filter(|u| u.user_id == *user_id).count() as u64)
    }
}

// ============================================================================
// In-Memory Query Runner
// ============================================================================

/// Returns canned rows and remembers every query it was asked to run
#[derive(Default)]
pub struct InMemoryQueryRunner {
    rows: Vec<serde_json::Value>,
    failure: Option<String>,
    executed: Arc<Mutex<Vec<(String, usize)>>>,
}

impl InMemoryQueryRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, rows: Vec<serde_json::Value>) -> Self {
        self.rows = rows;
        self
    }

    /// Make every query fail with a validation error
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn executed(&self) -> Vec<(String, usize)> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryRunner for InMemoryQueryRunner {
    async fn run_select(
        &self,
        sql: &str,
        max_rows: usize,
    ) -> Result<Vec<serde_json::Value>, DomainError> {
        self.executed
            .lock()
            .unwrap()
            .push((sql.to_string(), max_rows));

        if let Some(ref message) = self.failure {
            return Err(DomainError::Validation(format!("Query failed: {}", message)));
        }
        Ok(self.rows.iter().take(max_rows).cloned().collect())
    }
}

// ============================================================================
// In-Memory Knowledge Base
// ============================================================================

#[derive(Default)]
pub struct InMemoryKnowledgeBase {
    documents: Arc<RwLock<HashMap<String, KnowledgeDocument>>>,
    reads: Arc<Mutex<usize>>,
}

impl InMemoryKnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, document: KnowledgeDocument) -> Self {
        self.documents
            .write()
            .unwrap()
            .insert(document.key.clone(), document);
        self
    }

    /// Number of lookups served, used to verify caching
    pub fn reads(&self) -> usize {
        *self.reads.lock().unwrap()
    }
}

#[async_trait]
impl KnowledgeBaseRepository for InMemoryKnowledgeBase {
    async fn find_by_kind(
        &self,
        kind: DocumentKind,
    ) -> Result<Vec<KnowledgeDocument>, KnowledgeBaseError> {
        *self.reads.lock().unwrap() += 1;
        let documents = self.documents.read().unwrap();
        let mut result: Vec<KnowledgeDocument> = documents
            .values()
            .filter(|d| d.kind == kind)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(result)
    }

    async fn find_by_key(
        &self,
        key: &str,
    ) -> Result<Option<KnowledgeDocument>, KnowledgeBaseError> {
        *self.reads.lock().unwrap() += 1;
        Ok(self.documents.read().unwrap().get(key).cloned())
    }

    async fn upsert(
        &self,
        document: &KnowledgeDocument,
    ) -> Result<KnowledgeDocument, KnowledgeBaseError> {
        let mut documents = self.documents.write().unwrap();
        let mut stored = document.clone();
        if stored.id.is_none() {
            stored.id = documents
                .get(&document.key)
                .and_then(|d| d.id.clone())
                .or_else(|| Some(uuid::Uuid::new_v4().simple().to_string()));
        }
        documents.insert(stored.key.clone(), stored.clone());
        Ok(stored)
    }
}

// ============================================================================
// Mock AI Client
// ============================================================================

/// Replies with scripted answers in order and records every request
#[derive(Default)]
pub struct MockAiClient {
    replies: Mutex<VecDeque<Result<String, u16>>>,
    requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl MockAiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(reply.to_string()));
        self
    }

    /// Queue an upstream failure with the given HTTP status
    pub fn with_failure(self, status: u16) -> Self {
        self.replies.lock().unwrap().push_back(Err(status));
        self
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AiClient for MockAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<AiCompletion, AiError> {
        self.requests.lock().unwrap().push(messages.to_vec());

        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(AiCompletion {
                content,
                prompt_tokens: 12,
                completion_tokens: 8,
            }),
            Some(Err(429)) => Err(AiError::RateLimited),
            Some(Err(status)) => Err(AiError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
            None => Err(AiError::InvalidResponse(
                "no scripted reply left".to_string(),
            )),
        }
    }
}

// ============================================================================
// Mock User Directory
// ============================================================================

#[derive(Default)]
pub struct MockUserDirectory {
    users: Vec<DirectoryUser>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: DirectoryUser) -> Self {
        self.users.push(user);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserDirectory for MockUserDirectory {
    async fn search_users(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<DirectoryUser>, DirectoryError> {
        self.queries.lock().unwrap().push(query.to_string());
        let query = query.to_lowercase();
        let starts = |v: &Option<String>| {
            v.as_ref()
                .map_or(false, |s| s.to_lowercase().starts_with(&query))
        };

        Ok(self
            .users
            .iter()
            .filter(|u| starts(&u.display_name) || starts(&u.mail))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_user(&self, id: &str) -> Result<Option<DirectoryUser>, DirectoryError> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }
}
