//! Key-value cache port and an in-memory TTL implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::StockCode;

/// Default key namespace.
pub const DEFAULT_NAMESPACE: &str = "stock_data_normalizer";
/// Default lifetime of cached quotes and stock lists.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {message}")]
    Unavailable { message: String },
    #[error("cached value could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Storage port used by the rotation service.
///
/// Values are JSON text; every write carries its own TTL.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
    /// Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;
}

/// Builds the namespaced keys shared by every cache client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteKeys {
    namespace: String,
}

impl QuoteKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn quote(&self, code: &StockCode) -> String {
        format!("{}:quote:{}", self.namespace, code)
    }

    pub fn stock_list(&self) -> String {
        format!("{}:stock_list:all", self.namespace)
    }

    pub fn rotation_index(&self) -> String {
        format!("{}:rotation_index", self.namespace)
    }
}

impl Default for QuoteKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now <= self.expires_at
    }
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<String, CacheEntry>,
    default_ttl: Duration,
}

impl CacheInner {
    fn new(default_ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            default_ttl,
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.map
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.body.clone())
    }

    fn put(&mut self, key: String, body: String, ttl_override: Option<Duration>) {
        let ttl = ttl_override.unwrap_or(self.default_ttl);
        let expires_at = Instant::now() + ttl;
        self.map.insert(key, CacheEntry { body, expires_at });
    }

    fn remove(&mut self, key: &str) -> bool {
        self.map
            .remove(key)
            .is_some_and(|entry| entry.is_live(Instant::now()))
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        self.map.retain(|_, entry| entry.expires_at > now);
    }
}

/// Thread-safe in-memory cache with per-entry expiry.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl CacheStore {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new(default_ttl))),
        }
    }

    /// Store using [`DEFAULT_TTL`].
    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }

    /// A store that accepts writes and keeps nothing.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Live value for `key`, if any.
    pub async fn get(&self, key: &str) -> Option<String> {
        let store = self.inner.read().await;
        store.get(key)
    }

    /// Insert `body`, expiring after `ttl_override` or the default TTL.
    /// No-op on a disabled store.
    pub async fn put(&self, key: String, body: String, ttl_override: Option<Duration>) {
        let mut store = self.inner.write().await;
        if store.default_ttl == Duration::ZERO {
            return;
        }
        store.put(key, body, ttl_override);
    }

    pub async fn remove(&self, key: &str) -> bool {
        let mut store = self.inner.write().await;
        store.remove(key)
    }

    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired();
    }

    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    /// Entry count, expired entries included.
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_disabled(&self) -> bool {
        let store = self.inner.read().await;
        store.default_ttl == Duration::ZERO
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}

#[async_trait]
impl CacheBackend for CacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(CacheStore::get(self, key).await)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.put(key.to_owned(), value, Some(ttl)).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.remove(key).await)
    }
}
