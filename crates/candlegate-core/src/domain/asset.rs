use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Generic `QUOTE-BASE` trading pair, e.g. `BTC-LTC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetPair {
    quote: String,
    base: String,
}

impl AssetPair {
    /// Parse and normalize a pair to uppercase, splitting on the first `-`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();

        let Some((quote, base)) = normalized.split_once('-') else {
            return Err(ValidationError::InvalidAssetPair {
                value: input.to_owned(),
            });
        };
        if quote.is_empty() || base.is_empty() {
            return Err(ValidationError::InvalidAssetPair {
                value: input.to_owned(),
            });
        }

        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '-';
            if !valid {
                return Err(ValidationError::AssetPairInvalidChar { ch, index });
            }
        }

        Ok(Self {
            quote: quote.to_owned(),
            base: base.to_owned(),
        })
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl Display for AssetPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.quote, self.base)
    }
}

impl TryFrom<String> for AssetPair {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for AssetPair {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AssetPair> for String {
    fn from(value: AssetPair) -> Self {
        value.to_string()
    }
}
