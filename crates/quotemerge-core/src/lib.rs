//! # Quotemerge Core
//!
//! Normalization and merging of A-share quote snapshots collected from
//! several overlapping providers.
//!
//! ## Overview
//!
//! - **Canonical quote record** with validated construction and a lossless
//!   JSON form
//! - **Per-provider normalizers** turning loosely typed payloads into records
//! - **Merge engine** keeping the best record per instrument and backfilling
//!   its gaps from the other providers
//! - **Rotating cache refresh** that polls one provider at a time
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Cache port, in-memory TTL store and key layout |
//! | [`config`] | Merge weight configuration |
//! | [`domain`] | Quote record, codes, fields and market classification |
//! | [`error`] | Core error types |
//! | [`merge`] | Deduplication, selection, enrichment and statistics |
//! | [`normalize`] | Provider payload normalizers |
//! | [`retry`] | Retry policy and backoff |
//! | [`rotation`] | Round-robin provider rotation feeding the cache |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust
//! use quotemerge_core::{normalize, MergeEngine, SourceId};
//! use serde_json::json;
//!
//! let eastmoney = normalize(
//!     SourceId::Eastmoney,
//!     &json!({"f12": "600000", "f14": "浦发银行", "f2": 10.5, "f5": 120000}),
//! )?;
//! let tencent = normalize(
//!     SourceId::Tencent,
//!     &json!({"code": "sh600000", "price": "10.51", "industry": "银行"}),
//! )?;
//!
//! let engine = MergeEngine::default();
//! let stats = engine.statistics(&[vec![eastmoney.clone()], vec![tencent.clone()]]);
//! let merged = engine.merge(vec![vec![eastmoney], vec![tencent]], true);
//!
//! assert_eq!(stats.total_records, 2);
//! assert_eq!(merged.len(), 1);
//! assert_eq!(merged[0].sector(), "银行");
//! # Ok::<(), quotemerge_core::ValidationError>(())
//! ```
//!
//! ## Error Handling
//!
//! Construction and decoding fail with [`ValidationError`]; weight tables and
//! config files fail with [`ConfigurationError`]. Merging itself never fails.

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod retry;
pub mod rotation;
pub mod source;

// Caching
pub use cache::{CacheBackend, CacheError, CacheStore, QuoteKeys};

// Configuration
pub use config::MergeConfig;

// Domain models
pub use domain::{
    FieldValue, FieldWeights, QuoteField, QuoteRecord, QuoteRecordBuilder, StockCode, UtcDateTime,
};

// Error types
pub use error::{ConfigurationError, CoreError, ValidationError};

// Merge engine
pub use merge::{merge_quotes, MergeEngine, MergeEngineBuilder, MergeStatistics, SourceWeights};

// Normalizers
pub use normalize::{normalize, normalize_batch, BatchOptions, NormalizeFailure, NormalizedBatch};

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Rotation
pub use rotation::{
    CacheUpdateReport, FetchError, FetchOutcome, QuoteFetcher, RotatingCacheService,
    RotationConfig, RotationStatus, StockListEntry,
};

// Source identifiers
pub use source::SourceId;
