use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::ExchangeId;

/// Validation errors raised while parsing domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("asset pair must have the form QUOTE-BASE: '{value}'")]
    InvalidAssetPair { value: String },
    #[error("asset pair contains invalid character '{ch}' at index {index}")]
    AssetPairInvalidChar { ch: char, index: usize },

    #[error(
        "invalid timeframe '{value}', expected one of 1m, 5m, 15m, 30m, 1h, 4h, 1d, 1w, 1M"
    )]
    InvalidTimeframe { value: String },
    #[error("Exchange, {value}, is not supported.")]
    InvalidExchange { value: String },

    #[error("unix timestamp {millis}ms is outside the supported date range")]
    TimestampOutOfRange { millis: i64 },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
}

/// Chart error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartErrorKind {
    MissingParameter,
    InvalidParameter,
    UnsupportedExchange,
    UnsupportedTimeframe,
    UpstreamFailure,
    NormalizationFailure,
    Internal,
}

/// Uniform error reported by chart fetches.
///
/// The message is what callers see in the `err` field of a response, so
/// upstream messages are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartError {
    kind: ChartErrorKind,
    message: String,
}

impl ChartError {
    pub fn missing_parameter(message: impl Into<String>) -> Self {
        Self {
            kind: ChartErrorKind::MissingParameter,
            message: message.into(),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self {
            kind: ChartErrorKind::InvalidParameter,
            message: message.into(),
        }
    }

    pub fn unsupported_exchange(exchange: impl Display) -> Self {
        Self {
            kind: ChartErrorKind::UnsupportedExchange,
            message: format!("Exchange, {exchange}, is not supported."),
        }
    }

    pub fn unsupported_timeframe(timeframe: &str, exchange: ExchangeId) -> Self {
        Self {
            kind: ChartErrorKind::UnsupportedTimeframe,
            message: format!("Timeframe, {timeframe}, not supported on {}.", exchange.label()),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            kind: ChartErrorKind::UpstreamFailure,
            message: message.into(),
        }
    }

    pub fn normalization(message: impl Into<String>) -> Self {
        Self {
            kind: ChartErrorKind::NormalizationFailure,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ChartErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ChartErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Validation failures are raised before any upstream call is made.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self.kind,
            ChartErrorKind::MissingParameter
                | ChartErrorKind::InvalidParameter
                | ChartErrorKind::UnsupportedExchange
                | ChartErrorKind::UnsupportedTimeframe
        )
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ChartErrorKind::MissingParameter => "chart.missing_parameter",
            ChartErrorKind::InvalidParameter => "chart.invalid_parameter",
            ChartErrorKind::UnsupportedExchange => "chart.unsupported_exchange",
            ChartErrorKind::UnsupportedTimeframe => "chart.unsupported_timeframe",
            ChartErrorKind::UpstreamFailure => "chart.upstream_failure",
            ChartErrorKind::NormalizationFailure => "chart.normalization_failure",
            ChartErrorKind::Internal => "chart.internal",
        }
    }
}

impl Display for ChartError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ChartError {}

impl From<ValidationError> for ChartError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::InvalidExchange { value } => Self::unsupported_exchange(value),
            ValidationError::NonFiniteValue { .. } => Self::normalization(error.to_string()),
            other => Self::invalid_parameter(other.to_string()),
        }
    }
}
