//! Provider payload → [`QuoteRecord`] conversion.
//!
//! Each provider ships loosely typed JSON objects. Field names differ by
//! provider (see the layouts in `providers`), values may be numbers or numeric
//! strings, and placeholders such as `"-"` mean "no data".

mod providers;
mod raw;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::QuoteRecord;
use crate::{SourceId, ValidationError};

use raw::{code_for_report, RawQuote};

/// Normalize one provider payload.
///
/// The record keeps the default quality score of 1.0; batch normalization
/// replaces it with the record's completeness.
pub fn normalize(source: SourceId, raw: &Value) -> Result<QuoteRecord, ValidationError> {
    providers::normalize_raw(source, RawQuote::new(raw)?)
}

/// Switches for [`normalize_batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Drop records that fail [`QuoteRecord::is_valid`].
    pub skip_invalid: bool,
    /// Set `quality_score` to the record's completeness.
    pub calculate_quality: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            skip_invalid: true,
            calculate_quality: true,
        }
    }
}

/// A payload that could not be normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizeFailure {
    pub index: usize,
    /// Extracted code, or `unknown`.
    pub code: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: ValidationError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub records: Vec<QuoteRecord>,
    pub failures: Vec<NormalizeFailure>,
    /// Records built successfully but dropped by `skip_invalid`.
    pub skipped: usize,
}

/// Normalize every payload; failures are collected, never propagated.
pub fn normalize_batch(
    source: SourceId,
    raws: &[Value],
    options: &BatchOptions,
) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for (index, raw) in raws.iter().enumerate() {
        let record = match normalize(source, raw) {
            Ok(record) => record,
            Err(error) => {
                let code = code_for_report(raw);
                debug!(
                    source = %source,
                    index,
                    code = %code,
                    error = %error,
                    "normalization failed"
                );
                batch.failures.push(NormalizeFailure { index, code, error });
                continue;
            }
        };

        if options.skip_invalid && !record.is_valid() {
            batch.skipped += 1;
            continue;
        }

        let record = if options.calculate_quality {
            record
                .with_quality_score(record.completeness())
                .unwrap_or(record)
        } else {
            record
        };
        batch.records.push(record);
    }

    if batch.failures.is_empty() {
        info!(source = %source, records = batch.records.len(), "normalized batch");
    } else {
        warn!(
            source = %source,
            records = batch.records.len(),
            failures = batch.failures.len(),
            "normalized batch with failures"
        );
    }
    batch
}

fn serialize_display<S: serde::Serializer>(
    error: &ValidationError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}
