use thiserror::Error;

/// Validation and contract errors raised while building a `QuoteRecord`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("stock code cannot be empty")]
    EmptyCode,
    #[error("stock code must be exactly 6 ASCII digits: '{value}'")]
    InvalidCode { value: String },
    #[error("no stock code found in payload")]
    MissingCode,

    #[error(
        "invalid source '{value}', expected one of tencent, eastmoney, sina, akshare, baostock, joinquant, tushare"
    )]
    InvalidSource { value: String },

    #[error("timestamp is not valid ISO-8601: '{value}'")]
    InvalidTimestamp { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("quality_score must be within [0, 1], got {value}")]
    QualityScoreOutOfRange { value: String },

    #[error("payload must be a JSON object")]
    NotAnObject,
    #[error("malformed quote record: {message}")]
    MalformedRecord { message: String },
}

/// Rejected engine or scheduler configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("weight for '{key}' must be within [0, 1], got {value}")]
    WeightOutOfRange { key: String, value: f64 },
    #[error("unknown quote field '{name}' in field weights")]
    UnknownField { name: String },
    #[error("rotation requires at least one source")]
    EmptyRotation,
    #[error("failed to read config '{path}': {message}")]
    Unreadable { path: String, message: String },
    #[error("failed to parse config: {message}")]
    Unparsable { message: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
