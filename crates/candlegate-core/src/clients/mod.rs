//! Upstream exchange client capabilities.
//!
//! Each exchange exposes one candle endpoint, modeled as a trait so the
//! adapters can be driven by the REST implementations in production and by
//! doubles in tests.
//!
//! | Capability | REST implementation | Endpoint |
//! |------------|---------------------|----------|
//! | [`BinanceClient`] | [`BinanceRestClient`] | `GET /api/v3/klines` |
//! | [`CoinbaseClient`] | [`CoinbaseRestClient`] | `GET /products/{id}/candles` |

mod binance;
mod coinbase;

use thiserror::Error;

use crate::http_client::HttpError;

pub use binance::{BinanceCandlesParams, BinanceClient, BinanceRawCandle, BinanceRestClient};
pub use coinbase::{
    CoinbaseClient, CoinbaseHistoricRatesParams, CoinbaseRawCandle, CoinbaseRestClient,
};

/// Failure reported by an exchange client. The message is surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ClientError {
    message: String,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<HttpError> for ClientError {
    fn from(error: HttpError) -> Self {
        Self::new(error.message())
    }
}

fn trim_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_owned()
}
