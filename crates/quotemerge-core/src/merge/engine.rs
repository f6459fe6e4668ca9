use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use super::stats::MergeStatistics;
use super::weights::SourceWeights;
use crate::config::MergeConfig;
use crate::domain::{FieldWeights, QuoteField, QuoteRecord, StockCode};
use crate::{ConfigurationError, SourceId};

const SOURCE_SHARE: f64 = 0.4;
const COMPLETENESS_SHARE: f64 = 0.4;
const BASE_SHARE: f64 = 0.2;

/// Fields a merge winner may borrow from losing candidates.
pub const ENRICH_FIELDS: [QuoteField; 8] = [
    QuoteField::Sector,
    QuoteField::MarketCap,
    QuoteField::TotalCap,
    QuoteField::TurnoverRate,
    QuoteField::High,
    QuoteField::Low,
    QuoteField::Open,
    QuoteField::PreClose,
];

/// Combines per-source record groups into one best record per code.
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    source_weights: SourceWeights,
    field_weights: FieldWeights,
}

impl MergeEngine {
    /// Build an engine from a loaded configuration, validating every weight.
    pub fn new(config: MergeConfig) -> Result<Self, ConfigurationError> {
        let mut builder = Self::builder();
        if let Some(field_weights) = config.field_table()? {
            builder = builder.field_table(field_weights);
        }
        if let Some(source_weights) = config.source_weights {
            builder = builder.source_weights(source_weights);
        }
        builder.build()
    }

    pub fn builder() -> MergeEngineBuilder {
        MergeEngineBuilder::default()
    }

    pub fn source_weight(&self, source: SourceId) -> f64 {
        self.source_weights.get(source)
    }

    pub fn field_weights(&self) -> &FieldWeights {
        &self.field_weights
    }

    /// Completeness against this engine's field table; unrounded, capped at 1.0.
    pub fn completeness(&self, record: &QuoteRecord) -> f64 {
        record.completeness_with(&self.field_weights)
    }

    pub fn score(&self, record: &QuoteRecord) -> f64 {
        self.source_weight(record.source()) * SOURCE_SHARE
            + self.completeness(record) * COMPLETENESS_SHARE
            + BASE_SHARE
    }

    /// Deduplicate by code, keeping the highest-scoring record of each code.
    ///
    /// Output order follows the first appearance of each code. Every returned
    /// record carries its merge score as `quality_score`; with `enrich`, a
    /// winner with competitors is first backfilled from them (see
    /// [`ENRICH_FIELDS`]).
    pub fn merge(&self, groups: Vec<Vec<QuoteRecord>>, enrich: bool) -> Vec<QuoteRecord> {
        let buckets = bucket_by_code(groups);
        let total: usize = buckets.iter().map(Vec::len).sum();

        let merged: Vec<QuoteRecord> = buckets
            .into_iter()
            .filter_map(|candidates| self.resolve(candidates, enrich))
            .collect();

        info!(
            total_records = total,
            unique_stocks = merged.len(),
            enrich,
            "merged quote groups"
        );
        merged
    }

    /// Input statistics; see [`MergeStatistics::collect`].
    pub fn statistics(&self, groups: &[Vec<QuoteRecord>]) -> MergeStatistics {
        MergeStatistics::collect(groups)
    }

    fn resolve(&self, candidates: Vec<QuoteRecord>, enrich: bool) -> Option<QuoteRecord> {
        let (best_index, best_score) = self.select(&candidates)?;
        let mut winner = candidates[best_index].clone();
        winner.set_quality_score(best_score);

        if enrich && candidates.len() > 1 {
            self.enrich(&mut winner, &candidates);
            winner.set_quality_score(self.score(&winner));
        }
        Some(winner)
    }

    /// Index and score of the strict maximum; the earliest candidate wins ties.
    fn select(&self, candidates: &[QuoteRecord]) -> Option<(usize, f64)> {
        candidates
            .iter()
            .enumerate()
            .map(|(index, record)| (index, self.score(record)))
            .fold(None, |best, (index, score)| match best {
                Some((_, best_score)) if score <= best_score => best,
                _ => Some((index, score)),
            })
    }

    fn enrich(&self, winner: &mut QuoteRecord, candidates: &[QuoteRecord]) {
        let mut donors: Vec<&QuoteRecord> = candidates.iter().collect();
        donors.sort_by(|a, b| {
            self.source_weight(b.source())
                .total_cmp(&self.source_weight(a.source()))
        });

        for field in ENRICH_FIELDS {
            if !winner.value(field).is_empty() {
                continue;
            }
            let donor = donors
                .iter()
                .copied()
                .find(|donor| !donor.value(field).is_empty());
            if let Some(donor) = donor {
                if winner.backfill_from(field, donor) {
                    debug!(
                        code = %winner.code(),
                        field = %field,
                        donor = %donor.source(),
                        "backfilled field"
                    );
                }
            }
        }
    }
}

fn bucket_by_code(groups: Vec<Vec<QuoteRecord>>) -> Vec<Vec<QuoteRecord>> {
    let mut index: HashMap<StockCode, usize> = HashMap::new();
    let mut buckets: Vec<Vec<QuoteRecord>> = Vec::new();

    for record in groups.into_iter().flatten() {
        match index.get(record.code()) {
            Some(&slot) => buckets[slot].push(record),
            None => {
                index.insert(record.code().clone(), buckets.len());
                buckets.push(vec![record]);
            }
        }
    }
    buckets
}

/// Merge with default weights and enrichment enabled.
pub fn merge_quotes(groups: Vec<Vec<QuoteRecord>>) -> Vec<QuoteRecord> {
    MergeEngine::default().merge(groups, true)
}

/// Builder for [`MergeEngine`]; weights are validated in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct MergeEngineBuilder {
    replacement: Option<BTreeMap<SourceId, f64>>,
    overrides: Vec<(SourceId, f64)>,
    field_weights: Option<Vec<(QuoteField, f64)>>,
}

impl MergeEngineBuilder {
    /// Override one source on top of the current table.
    pub fn source_weight(mut self, source: SourceId, weight: f64) -> Self {
        self.overrides.push((source, weight));
        self
    }

    /// Replace the default source table.
    pub fn source_weights(mut self, weights: impl IntoIterator<Item = (SourceId, f64)>) -> Self {
        self.replacement = Some(weights.into_iter().collect());
        self.overrides.clear();
        self
    }

    pub fn field_weights(mut self, weights: impl IntoIterator<Item = (QuoteField, f64)>) -> Self {
        self.field_weights = Some(weights.into_iter().collect());
        self
    }

    pub fn field_table(self, table: FieldWeights) -> Self {
        self.field_weights(table.iter())
    }

    pub fn build(self) -> Result<MergeEngine, ConfigurationError> {
        let mut source_weights = match self.replacement {
            Some(table) => SourceWeights::new(table)?,
            None => SourceWeights::default(),
        };
        for (source, weight) in self.overrides {
            source_weights.set(source, weight)?;
        }

        let field_weights = match self.field_weights {
            Some(entries) => FieldWeights::new(entries)?,
            None => FieldWeights::default(),
        };

        Ok(MergeEngine {
            source_weights,
            field_weights,
        })
    }
}
