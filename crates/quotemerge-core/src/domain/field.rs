use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigurationError;

/// Addressable data fields of a [`QuoteRecord`](super::QuoteRecord).
///
/// Names match the keys of the serialized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteField {
    Code,
    Name,
    Price,
    Open,
    High,
    Low,
    PreClose,
    ChangeAmount,
    ChangePercent,
    Volume,
    Amount,
    TurnoverRate,
    MarketCap,
    TotalCap,
    Market,
    Board,
    Sector,
    IsSt,
    IsChinext,
    IsKcb,
    Suspended,
}

impl QuoteField {
    pub const ALL: [Self; 21] = [
        Self::Code,
        Self::Name,
        Self::Price,
        Self::Open,
        Self::High,
        Self::Low,
        Self::PreClose,
        Self::ChangeAmount,
        Self::ChangePercent,
        Self::Volume,
        Self::Amount,
        Self::TurnoverRate,
        Self::MarketCap,
        Self::TotalCap,
        Self::Market,
        Self::Board,
        Self::Sector,
        Self::IsSt,
        Self::IsChinext,
        Self::IsKcb,
        Self::Suspended,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Name => "name",
            Self::Price => "price",
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::PreClose => "pre_close",
            Self::ChangeAmount => "change_amount",
            Self::ChangePercent => "change_percent",
            Self::Volume => "volume",
            Self::Amount => "amount",
            Self::TurnoverRate => "turnover_rate",
            Self::MarketCap => "market_cap",
            Self::TotalCap => "total_cap",
            Self::Market => "market",
            Self::Board => "board",
            Self::Sector => "sector",
            Self::IsSt => "is_st",
            Self::IsChinext => "is_chinext",
            Self::IsKcb => "is_kcb",
            Self::Suspended => "suspended",
        }
    }
}

impl Display for QuoteField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteField {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| ConfigurationError::UnknownField {
                name: value.to_owned(),
            })
    }
}

/// Borrowed view of one field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Number(f64),
    Count(u64),
    Text(&'a str),
    Flag(bool),
}

impl FieldValue<'_> {
    /// Nonzero numbers, non-blank strings and every boolean count as present.
    pub fn is_present(self) -> bool {
        match self {
            Self::Number(value) => value != 0.0,
            Self::Count(value) => value != 0,
            Self::Text(value) => !value.trim().is_empty(),
            Self::Flag(_) => true,
        }
    }

    /// Zero, `false` or the empty string. Unlike [`is_present`](Self::is_present),
    /// whitespace counts as a value.
    pub fn is_empty(self) -> bool {
        match self {
            Self::Number(value) => value == 0.0,
            Self::Count(value) => value == 0,
            Self::Text(value) => value.is_empty(),
            Self::Flag(value) => !value,
        }
    }
}

/// Ordered field → weight table used for completeness scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldWeights(Vec<(QuoteField, f64)>);

impl FieldWeights {
    /// Build a table, rejecting weights outside `[0, 1]`.
    ///
    /// A field listed twice keeps its last weight at its first position.
    pub fn new(
        entries: impl IntoIterator<Item = (QuoteField, f64)>,
    ) -> Result<Self, ConfigurationError> {
        let mut table: Vec<(QuoteField, f64)> = Vec::new();
        for (field, weight) in entries {
            check_weight(field.as_str(), weight)?;
            match table.iter_mut().find(|(existing, _)| *existing == field) {
                Some(slot) => slot.1 = weight,
                None => table.push((field, weight)),
            }
        }
        Ok(Self(table))
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuoteField, f64)> + '_ {
        self.0.iter().copied()
    }

    pub fn get(&self, field: QuoteField) -> Option<f64> {
        self.iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, weight)| weight)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self(DEFAULT_FIELD_WEIGHTS.to_vec())
    }
}

/// Default completeness table; the weights sum to 1.00.
pub const DEFAULT_FIELD_WEIGHTS: [(QuoteField, f64); 14] = [
    (QuoteField::Price, 0.15),
    (QuoteField::Volume, 0.10),
    (QuoteField::Amount, 0.10),
    (QuoteField::TurnoverRate, 0.08),
    (QuoteField::MarketCap, 0.08),
    (QuoteField::High, 0.05),
    (QuoteField::Low, 0.05),
    (QuoteField::Open, 0.05),
    (QuoteField::PreClose, 0.05),
    (QuoteField::Sector, 0.10),
    (QuoteField::Market, 0.05),
    (QuoteField::Board, 0.04),
    (QuoteField::Name, 0.05),
    (QuoteField::ChangePercent, 0.05),
];

pub(crate) fn check_weight(key: &str, weight: f64) -> Result<(), ConfigurationError> {
    if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
        return Err(ConfigurationError::WeightOutOfRange {
            key: key.to_owned(),
            value: weight,
        });
    }
    Ok(())
}
