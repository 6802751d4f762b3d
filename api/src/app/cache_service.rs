//! In-memory cache service
//!
//! A typed wrapper around a moka cache. Values of any `Clone + Send + Sync`
//! type are stored behind `Arc<dyn Any>` and cloned out on read, so one cache
//! serves profiles, knowledge documents and AI results alike.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sha2::{Digest, Sha256};

use crate::domain::entities::{DocumentKind, UserId};

type CachedValue = Arc<dyn Any + Send + Sync>;

/// Cache key builders
pub mod keys {
    use super::*;

    pub const ABOUT_US: &str = "bulletin:about-us";
    pub const PROFILE_PREFIX: &str = "profile:";

    pub fn profile(user_id: &UserId) -> String {
        format!("{}{}", PROFILE_PREFIX, user_id)
    }

    pub fn knowledge(kind: DocumentKind) -> String {
        format!("knowledge:{}", kind)
    }

    pub fn ai_tags(content: &str) -> String {
        format!("ai:tags:{}", content_hash(content))
    }
}

/// Hex SHA-256 of trimmed content
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.trim().as_bytes()))
}

pub struct CacheService {
    cache: Cache<String, CachedValue>,
}

impl CacheService {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    /// Get a cached value; a value stored under another type counts as a miss
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let value = self.cache.get(key).await?;
        match value.downcast_ref::<T>() {
            Some(v) => Some(v.clone()),
            None => {
                tracing::warn!(key, "Cached value has unexpected type");
                None
            }
        }
    }

    pub async fn insert<T>(&self, key: &str, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.cache.insert(key.to_string(), Arc::new(value)).await;
    }

    /// Return the cached value or compute, store and return it.
    /// Errors from `init` are returned and nothing is cached.
    pub async fn get_or_try_insert_with<T, E, F, Fut>(&self, key: &str, init: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key).await {
            tracing::debug!(key, "Cache hit");
            return Ok(hit);
        }

        let value = init().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Invalidate every key starting with `prefix`, returning how many were dropped
    pub async fn invalidate_prefix(&self, prefix: &str) -> u64 {
        let keys: Vec<Arc<String>> = self
            .cache
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k)
            .collect();

        for key in &keys {
            self.cache.invalidate(key.as_str()).await;
        }
        tracing::info!(prefix, count = keys.len(), "Cache entries invalidated");
        keys.len() as u64
    }

    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        tracing::info!("Cache cleared");
    }

    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}
