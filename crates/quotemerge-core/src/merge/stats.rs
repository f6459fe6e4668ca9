use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::market::{MARKET_BJ, MARKET_SH, MARKET_SZ};
use crate::domain::round2;
use crate::QuoteRecord;

const UNKNOWN_BOARD: &str = "unknown";

/// Aggregate report over the *input* of a merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeStatistics {
    /// Input record count per source tag.
    pub sources: BTreeMap<String, usize>,
    pub total_records: usize,
    pub unique_stocks: usize,
    /// Unique codes per market; `SH`, `SZ`, `BJ` and `""` are always present.
    pub by_market: BTreeMap<String, usize>,
    /// Unique codes per board; an empty board is reported as `unknown`.
    pub by_board: BTreeMap<String, usize>,
    /// Mean input quality score, rounded to 2 decimals.
    pub avg_quality_score: f64,
}

impl MergeStatistics {
    /// Tally `groups` without consuming or modifying them.
    ///
    /// Market and board buckets are taken from the first record seen for each
    /// code.
    pub fn collect(groups: &[Vec<QuoteRecord>]) -> Self {
        let mut sources = BTreeMap::new();
        let mut by_market: BTreeMap<String, usize> = [MARKET_SH, MARKET_SZ, MARKET_BJ, ""]
            .into_iter()
            .map(|market| (market.to_owned(), 0))
            .collect();
        let mut by_board = BTreeMap::new();
        let mut seen = HashSet::new();
        let mut total_records = 0_usize;
        let mut score_sum = 0.0_f64;

        for record in groups.iter().flatten() {
            total_records += 1;
            score_sum += record.quality_score();
            *sources.entry(record.source().as_str().to_owned()).or_insert(0) += 1;

            if !seen.insert(record.code()) {
                continue;
            }

            let market = match record.market() {
                MARKET_SH | MARKET_SZ | MARKET_BJ => record.market(),
                _ => "",
            };
            *by_market.entry(market.to_owned()).or_insert(0) += 1;

            let board = if record.board().is_empty() {
                UNKNOWN_BOARD
            } else {
                record.board()
            };
            *by_board.entry(board.to_owned()).or_insert(0) += 1;
        }

        let avg_quality_score = if total_records == 0 {
            0.0
        } else {
            round2(score_sum / total_records as f64)
        };

        Self {
            sources,
            total_records,
            unique_stocks: seen.len(),
            by_market,
            by_board,
            avg_quality_score,
        }
    }
}
