use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::field::{FieldValue, FieldWeights, QuoteField};
use super::market::{detect_board, normalize_market};
use super::{StockCode, UtcDateTime};
use crate::{CoreError, SourceId, ValidationError};

/// One point-in-time snapshot of one instrument from one provider.
///
/// Records are values: every constructor validates, and the only way to
/// change a record is to build a new one (see [`QuoteRecord::to_builder`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuoteRecordData", into = "QuoteRecordData")]
pub struct QuoteRecord {
    code: StockCode,
    name: String,

    price: f64,
    open: f64,
    high: f64,
    low: f64,
    pre_close: f64,

    change_amount: f64,
    change_percent: f64,

    volume: u64,
    amount: f64,
    turnover_rate: f64,

    market_cap: f64,
    total_cap: f64,

    market: String,
    board: String,
    sector: String,

    is_st: bool,
    is_chinext: bool,
    is_kcb: bool,
    suspended: bool,

    source: SourceId,
    fetched_at: UtcDateTime,
    quality_score: f64,
}

impl QuoteRecord {
    pub fn builder(code: impl Into<String>, source: SourceId) -> QuoteRecordBuilder {
        QuoteRecordBuilder::new(code, source)
    }

    /// Start a builder pre-filled with this record's values.
    pub fn to_builder(&self) -> QuoteRecordBuilder {
        QuoteRecordBuilder {
            code: self.code.as_str().to_owned(),
            name: self.name.clone(),
            price: self.price,
            open: self.open,
            high: self.high,
            low: self.low,
            pre_close: self.pre_close,
            change_amount: self.change_amount,
            change_percent: self.change_percent,
            volume: self.volume,
            amount: self.amount,
            turnover_rate: self.turnover_rate,
            market_cap: self.market_cap,
            total_cap: self.total_cap,
            market: self.market.clone(),
            board: self.board.clone(),
            sector: self.sector.clone(),
            is_st: self.is_st,
            is_chinext: self.is_chinext,
            is_kcb: self.is_kcb,
            suspended: self.suspended,
            source: self.source,
            fetched_at: Some(self.fetched_at),
            quality_score: self.quality_score,
        }
    }

    pub fn code(&self) -> &StockCode {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn open(&self) -> f64 {
        self.open
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn pre_close(&self) -> f64 {
        self.pre_close
    }

    pub fn change_amount(&self) -> f64 {
        self.change_amount
    }

    pub fn change_percent(&self) -> f64 {
        self.change_percent
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn turnover_rate(&self) -> f64 {
        self.turnover_rate
    }

    pub fn market_cap(&self) -> f64 {
        self.market_cap
    }

    pub fn total_cap(&self) -> f64 {
        self.total_cap
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn board(&self) -> &str {
        &self.board
    }

    pub fn sector(&self) -> &str {
        &self.sector
    }

    pub fn is_st(&self) -> bool {
        self.is_st
    }

    pub fn is_chinext(&self) -> bool {
        self.is_chinext
    }

    pub fn is_kcb(&self) -> bool {
        self.is_kcb
    }

    pub fn suspended(&self) -> bool {
        self.suspended
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn fetched_at(&self) -> UtcDateTime {
        self.fetched_at
    }

    pub fn quality_score(&self) -> f64 {
        self.quality_score
    }

    /// Copy of this record carrying a new quality score.
    pub fn with_quality_score(&self, score: f64) -> Result<Self, ValidationError> {
        check_quality_score(score)?;
        let mut next = self.clone();
        next.quality_score = score;
        Ok(next)
    }

    /// Usable downstream: positive price and a six-digit code.
    pub fn is_valid(&self) -> bool {
        self.price > 0.0
            && self.code.as_str().len() == 6
            && self.code.as_str().bytes().all(|b| b.is_ascii_digit())
    }

    /// Completeness against the default field table, rounded to 2 decimals.
    pub fn completeness(&self) -> f64 {
        round2(self.completeness_with(&FieldWeights::default()))
    }

    /// Unrounded completeness against an arbitrary table, capped at 1.0.
    pub fn completeness_with(&self, weights: &FieldWeights) -> f64 {
        let score: f64 = weights
            .iter()
            .filter(|(field, _)| self.value(*field).is_present())
            .map(|(_, weight)| weight)
            .sum();
        score.min(1.0)
    }

    pub fn value(&self, field: QuoteField) -> FieldValue<'_> {
        match field {
            QuoteField::Code => FieldValue::Text(self.code.as_str()),
            QuoteField::Name => FieldValue::Text(&self.name),
            QuoteField::Price => FieldValue::Number(self.price),
            QuoteField::Open => FieldValue::Number(self.open),
            QuoteField::High => FieldValue::Number(self.high),
            QuoteField::Low => FieldValue::Number(self.low),
            QuoteField::PreClose => FieldValue::Number(self.pre_close),
            QuoteField::ChangeAmount => FieldValue::Number(self.change_amount),
            QuoteField::ChangePercent => FieldValue::Number(self.change_percent),
            QuoteField::Volume => FieldValue::Count(self.volume),
            QuoteField::Amount => FieldValue::Number(self.amount),
            QuoteField::TurnoverRate => FieldValue::Number(self.turnover_rate),
            QuoteField::MarketCap => FieldValue::Number(self.market_cap),
            QuoteField::TotalCap => FieldValue::Number(self.total_cap),
            QuoteField::Market => FieldValue::Text(&self.market),
            QuoteField::Board => FieldValue::Text(&self.board),
            QuoteField::Sector => FieldValue::Text(&self.sector),
            QuoteField::IsSt => FieldValue::Flag(self.is_st),
            QuoteField::IsChinext => FieldValue::Flag(self.is_chinext),
            QuoteField::IsKcb => FieldValue::Flag(self.is_kcb),
            QuoteField::Suspended => FieldValue::Flag(self.suspended),
        }
    }

    /// Copy one enrichable field from `donor`. Returns `false` (and copies
    /// nothing) for fields outside the enrichment set.
    pub(crate) fn backfill_from(&mut self, field: QuoteField, donor: &QuoteRecord) -> bool {
        match field {
            QuoteField::Sector => self.sector.clone_from(&donor.sector),
            QuoteField::MarketCap => self.market_cap = donor.market_cap,
            QuoteField::TotalCap => self.total_cap = donor.total_cap,
            QuoteField::TurnoverRate => self.turnover_rate = donor.turnover_rate,
            QuoteField::High => self.high = donor.high,
            QuoteField::Low => self.low = donor.low,
            QuoteField::Open => self.open = donor.open,
            QuoteField::PreClose => self.pre_close = donor.pre_close,
            _ => return false,
        }
        true
    }

    pub(crate) fn set_quality_score(&mut self, score: f64) {
        self.quality_score = score.clamp(0.0, 1.0);
    }

    pub fn to_value(&self) -> Result<Value, CoreError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a plain key-value object, re-running construction validation.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::NotAnObject);
        }
        let data: QuoteRecordData =
            serde_json::from_value(value).map_err(|error| ValidationError::MalformedRecord {
                message: error.to_string(),
            })?;
        Self::try_from(data)
    }

    pub fn from_json(input: &str) -> Result<Self, ValidationError> {
        let value: Value =
            serde_json::from_str(input).map_err(|error| ValidationError::MalformedRecord {
                message: error.to_string(),
            })?;
        Self::from_value(value)
    }
}

/// Validating builder for [`QuoteRecord`].
#[derive(Debug, Clone)]
pub struct QuoteRecordBuilder {
    code: String,
    name: String,
    price: f64,
    open: f64,
    high: f64,
    low: f64,
    pre_close: f64,
    change_amount: f64,
    change_percent: f64,
    volume: u64,
    amount: f64,
    turnover_rate: f64,
    market_cap: f64,
    total_cap: f64,
    market: String,
    board: String,
    sector: String,
    is_st: bool,
    is_chinext: bool,
    is_kcb: bool,
    suspended: bool,
    source: SourceId,
    fetched_at: Option<UtcDateTime>,
    quality_score: f64,
}

macro_rules! setter {
    ($($field:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $field(mut self, value: $ty) -> Self {
                self.$field = value;
                self
            }
        )*
    };
}

macro_rules! text_setter {
    ($($field:ident),* $(,)?) => {
        $(
            pub fn $field(mut self, value: impl Into<String>) -> Self {
                self.$field = value.into();
                self
            }
        )*
    };
}

impl QuoteRecordBuilder {
    pub fn new(code: impl Into<String>, source: SourceId) -> Self {
        Self {
            code: code.into(),
            name: String::new(),
            price: 0.0,
            open: 0.0,
            high: 0.0,
            low: 0.0,
            pre_close: 0.0,
            change_amount: 0.0,
            change_percent: 0.0,
            volume: 0,
            amount: 0.0,
            turnover_rate: 0.0,
            market_cap: 0.0,
            total_cap: 0.0,
            market: String::new(),
            board: String::new(),
            sector: String::new(),
            is_st: false,
            is_chinext: false,
            is_kcb: false,
            suspended: false,
            source,
            fetched_at: None,
            quality_score: 1.0,
        }
    }

    setter! {
        price: f64,
        open: f64,
        high: f64,
        low: f64,
        pre_close: f64,
        change_amount: f64,
        change_percent: f64,
        volume: u64,
        amount: f64,
        turnover_rate: f64,
        market_cap: f64,
        total_cap: f64,
        is_st: bool,
        is_chinext: bool,
        is_kcb: bool,
        suspended: bool,
        source: SourceId,
        quality_score: f64,
    }

    text_setter!(name, market, board, sector);

    pub fn fetched_at(mut self, value: UtcDateTime) -> Self {
        self.fetched_at = Some(value);
        self
    }

    pub fn build(self) -> Result<QuoteRecord, ValidationError> {
        let code = StockCode::parse(&self.code)?;

        for (field, value) in [
            ("price", self.price),
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("pre_close", self.pre_close),
            ("amount", self.amount),
            ("turnover_rate", self.turnover_rate),
            ("market_cap", self.market_cap),
            ("total_cap", self.total_cap),
        ] {
            validate_non_negative(field, value)?;
        }
        validate_finite("change_amount", self.change_amount)?;
        validate_finite("change_percent", self.change_percent)?;
        check_quality_score(self.quality_score)?;

        let board = if self.board.is_empty() {
            detect_board(&code).to_owned()
        } else {
            self.board
        };

        Ok(QuoteRecord {
            market: normalize_market(&self.market),
            board,
            code,
            name: self.name,
            price: self.price,
            open: self.open,
            high: self.high,
            low: self.low,
            pre_close: self.pre_close,
            change_amount: self.change_amount,
            change_percent: self.change_percent,
            volume: self.volume,
            amount: self.amount,
            turnover_rate: self.turnover_rate,
            market_cap: self.market_cap,
            total_cap: self.total_cap,
            sector: self.sector,
            is_st: self.is_st,
            is_chinext: self.is_chinext,
            is_kcb: self.is_kcb,
            suspended: self.suspended,
            source: self.source,
            fetched_at: self.fetched_at.unwrap_or_else(UtcDateTime::now),
            quality_score: self.quality_score,
        })
    }
}

/// Wire shape of a record: a flat object with string-tagged source and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRecordData {
    code: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    open: f64,
    #[serde(default)]
    high: f64,
    #[serde(default)]
    low: f64,
    #[serde(default)]
    pre_close: f64,
    #[serde(default)]
    change_amount: f64,
    #[serde(default)]
    change_percent: f64,
    #[serde(default)]
    volume: u64,
    #[serde(default)]
    amount: f64,
    #[serde(default)]
    turnover_rate: f64,
    #[serde(default)]
    market_cap: f64,
    #[serde(default)]
    total_cap: f64,
    #[serde(default)]
    market: String,
    #[serde(default)]
    board: String,
    #[serde(default)]
    sector: String,
    #[serde(default)]
    is_st: bool,
    #[serde(default)]
    is_chinext: bool,
    #[serde(default)]
    is_kcb: bool,
    #[serde(default)]
    suspended: bool,
    source: String,
    #[serde(default = "default_quality_score")]
    quality_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fetched_at: Option<String>,
}

fn default_quality_score() -> f64 {
    1.0
}

impl From<QuoteRecord> for QuoteRecordData {
    fn from(record: QuoteRecord) -> Self {
        Self {
            code: record.code.into(),
            name: record.name,
            price: record.price,
            open: record.open,
            high: record.high,
            low: record.low,
            pre_close: record.pre_close,
            change_amount: record.change_amount,
            change_percent: record.change_percent,
            volume: record.volume,
            amount: record.amount,
            turnover_rate: record.turnover_rate,
            market_cap: record.market_cap,
            total_cap: record.total_cap,
            market: record.market,
            board: record.board,
            sector: record.sector,
            is_st: record.is_st,
            is_chinext: record.is_chinext,
            is_kcb: record.is_kcb,
            suspended: record.suspended,
            source: record.source.as_str().to_owned(),
            quality_score: record.quality_score,
            fetched_at: Some(record.fetched_at.format_rfc3339()),
        }
    }
}

impl TryFrom<QuoteRecordData> for QuoteRecord {
    type Error = ValidationError;

    fn try_from(data: QuoteRecordData) -> Result<Self, Self::Error> {
        let source: SourceId = data.source.parse()?;
        let mut builder = QuoteRecordBuilder::new(data.code, source)
            .name(data.name)
            .price(data.price)
            .open(data.open)
            .high(data.high)
            .low(data.low)
            .pre_close(data.pre_close)
            .change_amount(data.change_amount)
            .change_percent(data.change_percent)
            .volume(data.volume)
            .amount(data.amount)
            .turnover_rate(data.turnover_rate)
            .market_cap(data.market_cap)
            .total_cap(data.total_cap)
            .market(data.market)
            .board(data.board)
            .sector(data.sector)
            .is_st(data.is_st)
            .is_chinext(data.is_chinext)
            .is_kcb(data.is_kcb)
            .suspended(data.suspended)
            .quality_score(data.quality_score);

        if let Some(raw) = data.fetched_at.as_deref() {
            builder = builder.fetched_at(UtcDateTime::parse(raw)?);
        }

        builder.build()
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn check_quality_score(score: f64) -> Result<(), ValidationError> {
    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(ValidationError::QualityScoreOutOfRange {
            value: score.to_string(),
        });
    }
    Ok(())
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
