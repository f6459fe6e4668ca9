//! Round-robin source rotation feeding a [`CacheBackend`].
//!
//! Each refresh talks to one provider at a time. The service starts from the
//! source after the one used last, retries it per [`RetryConfig`], and only
//! then moves on, so load is spread across providers without parallel calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheBackend, CacheError, QuoteKeys, DEFAULT_NAMESPACE, DEFAULT_TTL};
use crate::domain::{QuoteRecord, StockCode, UtcDateTime};
use crate::normalize::{normalize_batch, BatchOptions};
use crate::retry::RetryConfig;
use crate::{ConfigurationError, SourceId};

/// Rotation order used when none is configured.
pub const DEFAULT_ROTATION: [SourceId; 6] = [
    SourceId::Tencent,
    SourceId::Eastmoney,
    SourceId::Akshare,
    SourceId::Baostock,
    SourceId::Joinquant,
    SourceId::Sina,
];

const ROTATION_INDEX_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream request failed: {message}")]
    Upstream { message: String },
    #[error("upstream rate limit reached")]
    RateLimited,
    #[error("upstream payload is malformed: {message}")]
    Malformed { message: String },
}

/// Raw payload source for one provider.
#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    /// Up to `limit` raw provider objects.
    async fn fetch(&self, limit: usize) -> Result<Vec<Value>, FetchError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotationConfig {
    pub sources: Vec<SourceId>,
    pub namespace: String,
    /// Lifetime of cached quotes and the stock list.
    pub ttl: Duration,
    /// Records requested per refresh when the caller does not say.
    pub limit: usize,
    /// Upper bound on sources tried per refresh.
    pub max_sources: usize,
    pub retry: RetryConfig,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            sources: DEFAULT_ROTATION.to_vec(),
            namespace: DEFAULT_NAMESPACE.to_owned(),
            ttl: DEFAULT_TTL,
            limit: 2000,
            max_sources: DEFAULT_ROTATION.len(),
            retry: RetryConfig::default(),
        }
    }
}

impl RotationConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.sources.is_empty() {
            return Err(ConfigurationError::EmptyRotation);
        }
        Ok(())
    }
}

/// Result of [`RotatingCacheService::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub records: Vec<QuoteRecord>,
    /// Source that produced `records`; `None` when every source failed.
    pub source: Option<SourceId>,
    /// Sources tried, in order.
    pub source_chain: Vec<SourceId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheUpdateReport {
    pub success: bool,
    pub source: Option<SourceId>,
    pub count: usize,
    pub cached: usize,
    pub timestamp: UtcDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationStatus {
    pub current_index: usize,
    pub current_source: SourceId,
    pub next_source: SourceId,
    pub total_sources: usize,
    pub sources: Vec<SourceId>,
}

/// Cached stock list entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockListEntry {
    pub data: Vec<QuoteRecord>,
    pub source: SourceId,
    pub count: usize,
    pub cached_at: UtcDateTime,
}

pub struct RotatingCacheService<B> {
    cache: B,
    keys: QuoteKeys,
    config: RotationConfig,
    fetchers: HashMap<SourceId, Arc<dyn QuoteFetcher>>,
}

impl<B: CacheBackend> RotatingCacheService<B> {
    pub fn new(cache: B, config: RotationConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            keys: QuoteKeys::new(config.namespace.clone()),
            cache,
            config,
            fetchers: HashMap::new(),
        })
    }

    pub fn with_defaults(cache: B) -> Self {
        Self {
            cache,
            keys: QuoteKeys::default(),
            config: RotationConfig::default(),
            fetchers: HashMap::new(),
        }
    }

    pub fn register_fetcher(&mut self, source: SourceId, fetcher: Arc<dyn QuoteFetcher>) {
        self.fetchers.insert(source, fetcher);
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    pub fn keys(&self) -> &QuoteKeys {
        &self.keys
    }

    pub fn cache(&self) -> &B {
        &self.cache
    }

    /// Fetch from the next source in rotation, falling back along the ring.
    pub async fn fetch(&self, limit: usize) -> FetchOutcome {
        let total = self.config.sources.len();
        let start = self.advance_index().await;
        let attempts = self.config.retry.attempts();
        let mut source_chain = Vec::new();

        for offset in 0..self.config.max_sources.min(total) {
            let index = (start + offset) % total;
            let source = self.config.sources[index];
            source_chain.push(source);

            for attempt in 0..attempts {
                let raws = self.fetch_raw(source, limit).await;
                if !raws.is_empty() {
                    let batch = normalize_batch(source, &raws, &BatchOptions::default());
                    if !batch.records.is_empty() {
                        info!(source = %source, records = batch.records.len(), "fetched quotes");
                        self.store_index(index).await;
                        return FetchOutcome {
                            records: batch.records,
                            source: Some(source),
                            source_chain,
                        };
                    }
                }

                if attempt + 1 < attempts {
                    tokio::time::sleep(self.config.retry.delay_for_attempt(attempt)).await;
                    warn!(source = %source, retry = attempt + 1, "retrying source");
                }
            }

            warn!(source = %source, attempts, "source exhausted, switching to next");
            self.advance_index().await;
        }

        error!(tried = source_chain.len(), "every source failed");
        FetchOutcome {
            records: Vec::new(),
            source: None,
            source_chain,
        }
    }

    /// Fetch and write one entry per record plus the stock list entry.
    ///
    /// `limit` and `ttl` default to the configured values.
    pub async fn update_cache(
        &self,
        limit: Option<usize>,
        ttl: Option<Duration>,
    ) -> CacheUpdateReport {
        let timestamp = UtcDateTime::now();
        let outcome = self.fetch(limit.unwrap_or(self.config.limit)).await;
        let Some(source) = outcome.source else {
            return CacheUpdateReport {
                success: false,
                source: None,
                count: 0,
                cached: 0,
                timestamp,
            };
        };

        let ttl = ttl.unwrap_or(self.config.ttl);
        let count = outcome.records.len();
        let mut cached = 0;

        for record in &outcome.records {
            match self.write_quote(record, ttl).await {
                Ok(()) => cached += 1,
                Err(err) => debug!(code = %record.code(), error = %err, "quote cache write failed"),
            }
        }

        let entry = StockListEntry {
            data: outcome.records,
            source,
            count,
            cached_at: UtcDateTime::now(),
        };
        if let Err(err) = self.write_json(&self.keys.stock_list(), &entry, ttl).await {
            error!(error = %err, "stock list cache write failed");
        }

        info!(source = %source, cached, "cache updated");
        CacheUpdateReport {
            success: cached > 0,
            source: Some(source),
            count,
            cached,
            timestamp,
        }
    }

    /// Cached stock list, if present.
    pub async fn stock_list(&self) -> Result<Option<StockListEntry>, CacheError> {
        self.read_json(&self.keys.stock_list()).await
    }

    pub async fn stock_quote(&self, code: &StockCode) -> Result<Option<QuoteRecord>, CacheError> {
        self.read_json(&self.keys.quote(code)).await
    }

    pub async fn rotation_status(&self) -> RotationStatus {
        let sources = self.config.sources.clone();
        let total = sources.len();
        let current_index = self.current_index().await;
        RotationStatus {
            current_index,
            current_source: sources[current_index],
            next_source: sources[(current_index + 1) % total],
            total_sources: total,
            sources,
        }
    }

    async fn fetch_raw(&self, source: SourceId, limit: usize) -> Vec<Value> {
        let Some(fetcher) = self.fetchers.get(&source) else {
            warn!(source = %source, "no fetcher registered");
            return Vec::new();
        };

        match fetcher.fetch(limit).await {
            Ok(raws) => {
                if !raws.is_empty() {
                    info!(source = %source, raw = raws.len(), "received raw quotes");
                }
                raws
            }
            Err(err) => {
                error!(source = %source, error = %err, "fetch failed");
                Vec::new()
            }
        }
    }

    /// Stored index, reset to 0 when missing, unreadable or out of range.
    async fn current_index(&self) -> usize {
        let stored = match self.cache.get(&self.keys.rotation_index()).await {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "rotation index read failed");
                None
            }
        };
        stored
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|index| *index < self.config.sources.len())
            .unwrap_or(0)
    }

    async fn store_index(&self, index: usize) {
        let key = self.keys.rotation_index();
        if let Err(err) = self.cache.set(&key, index.to_string(), ROTATION_INDEX_TTL).await {
            warn!(error = %err, "rotation index write failed");
        }
    }

    async fn advance_index(&self) -> usize {
        let next = (self.current_index().await + 1) % self.config.sources.len();
        self.store_index(next).await;
        next
    }

    async fn write_quote(&self, record: &QuoteRecord, ttl: Duration) -> Result<(), CacheError> {
        self.write_json(&self.keys.quote(record.code()), record, ttl).await
    }

    async fn write_json<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let body = serde_json::to_string(value)?;
        self.cache.set(key, body, ttl).await
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, CacheError> {
        match self.cache.get(key).await? {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }
}
