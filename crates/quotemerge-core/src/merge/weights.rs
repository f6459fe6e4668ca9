use std::collections::HashMap;

use crate::domain::check_weight;
use crate::{ConfigurationError, SourceId};

/// Weight assumed for a source missing from the table.
pub const UNLISTED_SOURCE_WEIGHT: f64 = 0.5;

/// Provider reliability ranking used by default.
pub const DEFAULT_SOURCE_WEIGHTS: [(SourceId, f64); 7] = [
    (SourceId::Tencent, 1.0),
    (SourceId::Eastmoney, 0.9),
    (SourceId::Akshare, 0.85),
    (SourceId::Baostock, 0.75),
    (SourceId::Sina, 0.70),
    (SourceId::Joinquant, 0.70),
    (SourceId::Tushare, 0.65),
];

/// Source → weight table in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceWeights {
    weights: HashMap<SourceId, f64>,
}

impl SourceWeights {
    pub fn new(
        entries: impl IntoIterator<Item = (SourceId, f64)>,
    ) -> Result<Self, ConfigurationError> {
        let mut weights = HashMap::new();
        for (source, weight) in entries {
            check_weight(source.as_str(), weight)?;
            weights.insert(source, weight);
        }
        Ok(Self { weights })
    }

    pub fn get(&self, source: SourceId) -> f64 {
        self.weights
            .get(&source)
            .copied()
            .unwrap_or(UNLISTED_SOURCE_WEIGHT)
    }

    pub fn contains(&self, source: SourceId) -> bool {
        self.weights.contains_key(&source)
    }

    pub(crate) fn set(&mut self, source: SourceId, weight: f64) -> Result<(), ConfigurationError> {
        check_weight(source.as_str(), weight)?;
        self.weights.insert(source, weight);
        Ok(())
    }
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            weights: DEFAULT_SOURCE_WEIGHTS.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_rank_tencent_first() {
        let weights = SourceWeights::default();
        assert_eq!(weights.get(SourceId::Tencent), 1.0);
        assert_eq!(weights.get(SourceId::Eastmoney), 0.9);
        assert_eq!(weights.get(SourceId::Tushare), 0.65);
    }

    #[test]
    fn unlisted_source_gets_half_weight() {
        let weights = SourceWeights::new([(SourceId::Eastmoney, 1.0)]).expect("valid");
        assert!(!weights.contains(SourceId::Tencent));
        assert_eq!(weights.get(SourceId::Tencent), UNLISTED_SOURCE_WEIGHT);
    }

    #[test]
    fn rejects_out_of_range_weight() {
        let err = SourceWeights::new([(SourceId::Sina, 1.2)]).expect_err("must fail");
        assert_eq!(
            err,
            ConfigurationError::WeightOutOfRange {
                key: String::from("sina"),
                value: 1.2,
            }
        );
    }
}
