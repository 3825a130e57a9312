use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Upstream exchanges candles can be sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExchangeId {
    Binance,
    Coinbase,
}

impl ExchangeId {
    pub const ALL: [Self; 2] = [Self::Binance, Self::Coinbase];

    /// Canonical upper-case identifier used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binance => "BINANCE",
            Self::Coinbase => "COINBASE",
        }
    }

    /// Human-facing name used in error messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Binance => "Binance",
            Self::Coinbase => "Coinbase",
        }
    }
}

impl Display for ExchangeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BINANCE" => Ok(Self::Binance),
            "COINBASE" => Ok(Self::Coinbase),
            other => Err(ValidationError::InvalidExchange {
                value: other.to_owned(),
            }),
        }
    }
}
