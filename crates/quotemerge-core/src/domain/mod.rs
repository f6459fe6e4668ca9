//! # Domain Models
//!
//! The canonical quote record and the value types it is built from.
//!
//! ## Overview
//!
//! Every provider payload ends up as a [`QuoteRecord`]. Records are validated
//! at construction and are never mutated afterwards; changes go through
//! [`QuoteRecord::to_builder`] or [`QuoteRecord::with_quality_score`].
//!
//! | Type | Description |
//! |------|-------------|
//! | [`QuoteRecord`] | One snapshot of one instrument from one provider |
//! | [`QuoteRecordBuilder`] | Validating builder for records |
//! | [`StockCode`] | Six-digit instrument code |
//! | [`QuoteField`] | Addressable record field, used by weight tables |
//! | [`FieldWeights`] | Ordered completeness weight table |
//! | [`UtcDateTime`] | UTC fetch timestamp |
//!
//! ## Validation
//!
//! ```rust
//! use quotemerge_core::{QuoteRecord, SourceId, ValidationError};
//!
//! let record = QuoteRecord::builder("600000", SourceId::Tencent)
//!     .price(10.5)
//!     .market("沪")
//!     .build()?;
//! assert_eq!(record.market(), "SH");
//! assert_eq!(record.board(), "沪A");
//!
//! let invalid = QuoteRecord::builder("60000", SourceId::Tencent).build();
//! assert!(matches!(invalid, Err(ValidationError::InvalidCode { .. })));
//! # Ok::<(), ValidationError>(())
//! ```

mod code;
mod field;
pub mod market;
mod record;
mod timestamp;

pub use code::StockCode;
pub use field::{FieldValue, FieldWeights, QuoteField, DEFAULT_FIELD_WEIGHTS};
pub use market::{
    detect_board, detect_market, is_chinext_code, is_kcb_code, is_st_name, normalize_market,
};
pub use record::{QuoteRecord, QuoteRecordBuilder, QuoteRecordData};
pub use timestamp::UtcDateTime;

pub(crate) use field::check_weight;
pub(crate) use record::round2;
