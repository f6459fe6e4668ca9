use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical provider identifiers carried on every quote record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Tencent,
    Eastmoney,
    Sina,
    Akshare,
    Baostock,
    Joinquant,
    Tushare,
}

impl SourceId {
    /// Every source, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Tencent,
        Self::Eastmoney,
        Self::Sina,
        Self::Akshare,
        Self::Baostock,
        Self::Joinquant,
        Self::Tushare,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tencent => "tencent",
            Self::Eastmoney => "eastmoney",
            Self::Sina => "sina",
            Self::Akshare => "akshare",
            Self::Baostock => "baostock",
            Self::Joinquant => "joinquant",
            Self::Tushare => "tushare",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tencent" => Ok(Self::Tencent),
            "eastmoney" => Ok(Self::Eastmoney),
            "sina" => Ok(Self::Sina),
            "akshare" => Ok(Self::Akshare),
            "baostock" => Ok(Self::Baostock),
            "joinquant" => Ok(Self::Joinquant),
            "tushare" => Ok(Self::Tushare),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}
