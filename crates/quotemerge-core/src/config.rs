//! Merge engine configuration loaded from JSON.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{FieldWeights, QuoteField};
use crate::{ConfigurationError, SourceId};

/// Optional weight overrides for a [`MergeEngine`](crate::MergeEngine).
///
/// ```json
/// {
///   "source_weights": { "tencent": 1.0, "sina": 0.8 },
///   "field_weights": { "price": 0.5, "sector": 0.5 }
/// }
/// ```
///
/// A `source_weights` map replaces the default ranking entirely; sources it
/// omits fall back to the unlisted weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_weights: Option<BTreeMap<SourceId, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_weights: Option<BTreeMap<String, f64>>,
}

impl MergeConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(input).map_err(|error| ConfigurationError::Unparsable {
            message: error.to_string(),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|error| ConfigurationError::Unreadable {
            path: path.display().to_string(),
            message: error.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    /// Resolve `field_weights` names into a validated table.
    pub fn field_table(&self) -> Result<Option<FieldWeights>, ConfigurationError> {
        let Some(raw) = &self.field_weights else {
            return Ok(None);
        };

        let mut entries = Vec::with_capacity(raw.len());
        for (name, weight) in raw {
            let field: QuoteField = name.parse()?;
            entries.push((field, *weight));
        }
        FieldWeights::new(entries).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_object_means_defaults() {
        let config = MergeConfig::from_json_str("{}").expect("valid config");
        assert_eq!(config, MergeConfig::default());
        assert_eq!(config.field_table(), Ok(None));
    }

    #[test]
    fn parses_source_and_field_weights() {
        let config = MergeConfig::from_json_str(
            r#"{"source_weights": {"sina": 0.9}, "field_weights": {"price": 0.6, "sector": 0.4}}"#,
        )
        .expect("valid config");

        let sources = config.source_weights.as_ref().expect("sources present");
        assert_eq!(sources.get(&SourceId::Sina), Some(&0.9));

        let table = config
            .field_table()
            .expect("valid table")
            .expect("table present");
        assert_eq!(table.get(QuoteField::Price), Some(0.6));
        assert_eq!(table.get(QuoteField::Sector), Some(0.4));
    }

    #[test]
    fn rejects_unknown_field_name() {
        let config = MergeConfig::from_json_str(r#"{"field_weights": {"bid": 0.5}}"#)
            .expect("syntactically valid");
        assert_eq!(
            config.field_table(),
            Err(ConfigurationError::UnknownField {
                name: String::from("bid"),
            })
        );
    }

    #[test]
    fn rejects_unknown_source_and_top_level_keys() {
        let err = MergeConfig::from_json_str(r#"{"source_weights": {"yahoo": 0.5}}"#)
            .expect_err("must fail");
        assert!(matches!(err, ConfigurationError::Unparsable { .. }));

        let err = MergeConfig::from_json_str(r#"{"weights": {}}"#).expect_err("must fail");
        assert!(matches!(err, ConfigurationError::Unparsable { .. }));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"source_weights": {{"tencent": 0.5}}}}"#).expect("write config");

        let config = MergeConfig::from_path(file.path()).expect("valid config");
        assert_eq!(
            config.source_weights.expect("sources present")[&SourceId::Tencent],
            0.5
        );
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = MergeConfig::from_path(dir.path().join("absent.json")).expect_err("must fail");
        assert!(matches!(err, ConfigurationError::Unreadable { .. }));
    }
}
