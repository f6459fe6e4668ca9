//! Error handling tests
//!
//! Bad records and bad configuration must surface as typed errors with
//! readable messages; nothing here may panic.

use std::io::Write;

use quotemerge_core::{
    normalize_batch, BatchOptions, ConfigurationError, CoreError, MergeConfig, MergeEngine,
    QuoteField, QuoteRecord, SourceId, StockCode, UtcDateTime, ValidationError,
};
use serde_json::json;

// =============================================================================
// Validation: record construction
// =============================================================================

#[test]
fn when_code_is_empty_or_malformed_construction_fails() {
    assert!(matches!(StockCode::parse("  "), Err(ValidationError::EmptyCode)));

    for raw in ["60000", "6000001", "60000a", "６０００００"] {
        let result = QuoteRecord::builder(raw, SourceId::Tencent).build();
        assert!(
            matches!(result, Err(ValidationError::InvalidCode { .. })),
            "{raw} should be rejected"
        );
    }
}

#[test]
fn when_numeric_fields_are_out_of_range_construction_fails() {
    let negative = QuoteRecord::builder("600000", SourceId::Tencent)
        .market_cap(-1.0)
        .build();
    assert!(matches!(
        negative,
        Err(ValidationError::NegativeValue { field: "market_cap" })
    ));

    let infinite = QuoteRecord::builder("600000", SourceId::Tencent)
        .change_percent(f64::INFINITY)
        .build();
    assert!(matches!(
        infinite,
        Err(ValidationError::NonFiniteValue { field: "change_percent" })
    ));

    let score = QuoteRecord::builder("600000", SourceId::Tencent)
        .quality_score(1.5)
        .build();
    assert!(matches!(
        score,
        Err(ValidationError::QualityScoreOutOfRange { .. })
    ));
}

#[test]
fn negative_change_is_allowed() {
    let record = QuoteRecord::builder("600000", SourceId::Tencent)
        .price(9.5)
        .change_amount(-0.5)
        .change_percent(-5.0)
        .build()
        .expect("a falling price is a valid record");
    assert_eq!(record.change_percent(), -5.0);
}

#[test]
fn quality_score_replacement_is_validated() {
    let record = QuoteRecord::builder("600000", SourceId::Tencent)
        .build()
        .expect("valid record");

    assert!(record.with_quality_score(0.0).is_ok());
    assert!(record.with_quality_score(-0.01).is_err());
    assert!(record.with_quality_score(f64::NAN).is_err());
}

// =============================================================================
// Validation: decoding
// =============================================================================

#[test]
fn when_decoding_an_unknown_source_the_error_names_it() {
    let error = QuoteRecord::from_value(json!({"code": "600000", "source": "bloomberg"}))
        .expect_err("unknown source");

    assert!(matches!(error, ValidationError::InvalidSource { .. }));
    assert!(error.to_string().contains("bloomberg"));
}

#[test]
fn when_decoding_a_non_object_it_is_rejected() {
    assert!(matches!(
        QuoteRecord::from_value(json!(["600000"])),
        Err(ValidationError::NotAnObject)
    ));
    assert!(matches!(
        QuoteRecord::from_json("{not json"),
        Err(ValidationError::MalformedRecord { .. })
    ));
    assert!(matches!(
        QuoteRecord::from_value(json!({"code": "600000"})),
        Err(ValidationError::MalformedRecord { .. })
    ));
}

#[test]
fn when_timestamp_is_unparsable_decoding_fails() {
    let result = QuoteRecord::from_value(json!({
        "code": "600000",
        "source": "tencent",
        "fetched_at": "yesterday",
    }));
    let error = result.expect_err("unparsable timestamp");
    assert!(matches!(error, ValidationError::InvalidTimestamp { .. }));
    assert_eq!(
        error.to_string(),
        "timestamp is not valid ISO-8601: 'yesterday'"
    );
}

#[test]
fn offset_free_timestamps_are_not_reported_as_non_utc() {
    // Given: A timestamp without any offset
    let parsed = UtcDateTime::parse("2024-01-02T09:30:00").expect("naive timestamp");

    // Then: It is read as UTC wall time
    assert_eq!(parsed.to_string(), "2024-01-02T09:30:00Z");

    // And: A broken one names the accepted format, not a UTC requirement
    let error = UtcDateTime::parse("2024-13-02").expect_err("bad month");
    assert!(!error.to_string().contains("UTC"));
}

#[test]
fn offset_timestamps_are_converted_to_utc() {
    let parsed = UtcDateTime::parse("2024-01-02T09:30:00+08:00").expect("offset timestamp");
    assert_eq!(parsed.to_string(), "2024-01-02T01:30:00Z");
}

#[test]
fn validation_errors_convert_into_core_errors() {
    let error: CoreError = ValidationError::MissingCode.into();
    assert_eq!(error.to_string(), "no stock code found in payload");
}

// =============================================================================
// Batch normalization: failures are collected
// =============================================================================

#[test]
fn when_a_batch_contains_bad_payloads_they_are_reported_not_raised() {
    // Given: A batch mixing good, invalid and broken payloads
    let raws = vec![
        json!({"f12": "600000", "f2": 10.5}),
        json!({"f12": "600001", "f2": -3.0}),
        json!({"f14": "无代码"}),
        json!({"f12": "000002", "f2": 0}),
    ];

    // When: Normalizing with default options
    let batch = normalize_batch(SourceId::Eastmoney, &raws, &BatchOptions::default());

    // Then: One record survives, two failures carry their index and code
    assert_eq!(batch.records.len(), 1);
    assert_eq!(batch.skipped, 1);
    assert_eq!(batch.failures.len(), 2);
    assert_eq!(batch.failures[0].index, 1);
    assert_eq!(batch.failures[0].code, "600001");
    assert_eq!(batch.failures[1].index, 2);
    assert_eq!(batch.failures[1].code, "unknown");

    let reported = serde_json::to_value(&batch.failures[1]).expect("serializable failure");
    assert_eq!(reported["error"], "no stock code found in payload");
}

#[test]
fn keeping_invalid_records_disables_the_skip() {
    let raws = vec![json!({"f12": "000002", "f2": 0})];
    let options = BatchOptions {
        skip_invalid: false,
        calculate_quality: false,
    };

    let batch = normalize_batch(SourceId::Eastmoney, &raws, &options);

    assert_eq!(batch.records.len(), 1);
    assert_eq!(batch.skipped, 0);
    assert_eq!(batch.records[0].quality_score(), 1.0);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn when_a_weight_is_out_of_range_the_engine_is_not_built() {
    let error = MergeEngine::builder()
        .source_weight(SourceId::Tencent, 1.2)
        .build()
        .expect_err("weight above 1");
    assert_eq!(
        error,
        ConfigurationError::WeightOutOfRange {
            key: String::from("tencent"),
            value: 1.2,
        }
    );

    let error = MergeEngine::builder()
        .field_weights([(QuoteField::Sector, -0.1)])
        .build()
        .expect_err("negative field weight");
    assert!(matches!(error, ConfigurationError::WeightOutOfRange { .. }));
}

#[test]
fn when_config_names_an_unknown_field_it_is_rejected() {
    let config =
        MergeConfig::from_json_str(r#"{"field_weights": {"dividend": 0.1}}"#).expect("parses");
    let error = MergeEngine::new(config).expect_err("unknown field");
    assert_eq!(
        error,
        ConfigurationError::UnknownField {
            name: String::from("dividend"),
        }
    );
}

#[test]
fn when_config_is_malformed_it_is_unparsable() {
    for input in [
        "{",
        r#"{"source_weights": {"bloomberg": 0.5}}"#,
        r#"{"weights": {}}"#,
    ] {
        let result = MergeConfig::from_json_str(input);
        assert!(
            matches!(result, Err(ConfigurationError::Unparsable { .. })),
            "{input} should be rejected"
        );
    }
}

#[test]
fn when_config_file_is_missing_it_is_unreadable() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("missing.json");

    let error = MergeConfig::from_path(&path).expect_err("missing file");
    assert!(matches!(error, ConfigurationError::Unreadable { .. }));
}

#[test]
fn config_file_weights_reach_the_engine() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, r#"{{"source_weights": {{"tushare": 1.0}}}}"#).expect("write config");

    let config = MergeConfig::from_path(file.path()).expect("config loads");
    let engine = MergeEngine::new(config).expect("valid engine");

    assert_eq!(engine.source_weight(SourceId::Tushare), 1.0);
    assert_eq!(engine.source_weight(SourceId::Tencent), 0.5);
}
