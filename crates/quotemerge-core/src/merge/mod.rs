//! Multi-source deduplication, best-record selection and enrichment.
//!
//! ```
//! use quotemerge_core::{merge_quotes, QuoteRecord, SourceId};
//!
//! let tencent = QuoteRecord::builder("000001", SourceId::Tencent).price(10.5).build()?;
//! let sina = QuoteRecord::builder("000001", SourceId::Sina)
//!     .price(10.4)
//!     .sector("银行")
//!     .build()?;
//!
//! let merged = merge_quotes(vec![vec![tencent], vec![sina]]);
//! assert_eq!(merged.len(), 1);
//! assert_eq!(merged[0].source(), SourceId::Tencent);
//! assert_eq!(merged[0].sector(), "银行");
//! # Ok::<(), quotemerge_core::ValidationError>(())
//! ```

mod engine;
mod stats;
mod weights;

pub use engine::{merge_quotes, MergeEngine, MergeEngineBuilder, ENRICH_FIELDS};
pub use stats::MergeStatistics;
pub use weights::{SourceWeights, DEFAULT_SOURCE_WEIGHTS, UNLISTED_SOURCE_WEIGHT};
