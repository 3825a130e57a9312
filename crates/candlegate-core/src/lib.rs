//! # Candlegate Core
//!
//! Exchange-neutral OHLCV chart fetching for Binance and Coinbase.
//!
//! ## Overview
//!
//! This crate provides everything behind the `/charts` endpoint:
//!
//! - **Domain types** for asset pairs, timeframes and canonical candles
//! - **Exchange trait** with one adapter per supported exchange
//! - **Upstream REST clients** over a swappable HTTP transport
//! - **Chart fetcher** that validates, formats, fetches and normalizes
//! - **Batch fetcher** for concurrent per-asset fan-out
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Binance and Coinbase [`Exchange`] implementations |
//! | [`batch`] | Concurrent batch fetch with per-asset results |
//! | [`clients`] | Upstream client capabilities and REST implementations |
//! | [`domain`] | Domain models (AssetPair, Timeframe, Candle) |
//! | [`error`] | Validation and chart errors |
//! | [`exchange`] | Exchange trait and query types |
//! | [`fetcher`] | Single-chart fetch |
//! | [`http_client`] | HTTP client abstraction |
//! | [`registry`] | Exchange lookup by identifier |
//! | [`source`] | Exchange identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use candlegate_core::{ChartFetcher, ChartRequest, ExchangeRegistryBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = ExchangeRegistryBuilder::new().build();
//!     let fetcher = ChartFetcher::new(Arc::new(registry));
//!
//!     let candles = fetcher
//!         .fetch(&ChartRequest::new("BTC-LTC", "BINANCE", "1d"))
//!         .await?;
//!     println!("{} candles", candles.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  /charts        │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  BatchFetcher   │────▶│  ChartFetcher    │
//! └─────────────────┘     └────────┬─────────┘
//!                                  │
//!                                  ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ ExchangeRegistry│────▶│ Exchange adapter │
//! └─────────────────┘     └────────┬─────────┘
//!                                  │
//!                                  ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ REST client     │────▶│ HTTP Client      │
//! │ (per exchange)  │     │ (reqwest)        │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every fetch returns a [`ChartError`] whose message is safe to hand back
//! to callers verbatim:
//!
//! ```rust
//! use candlegate_core::{ChartError, ChartErrorKind, ExchangeId};
//!
//! let error = ChartError::unsupported_timeframe("4h", ExchangeId::Coinbase);
//! assert_eq!(error.kind(), ChartErrorKind::UnsupportedTimeframe);
//! assert_eq!(error.to_string(), "Timeframe, 4h, not supported on Coinbase.");
//! assert!(error.is_validation());
//! ```

pub mod adapters;
pub mod batch;
pub mod clients;
pub mod domain;
pub mod error;
pub mod exchange;
pub mod fetcher;
pub mod http_client;
pub mod registry;
pub mod source;

// Exchange adapters
pub use adapters::{BinanceExchange, CoinbaseExchange};

// Batch fan-out
pub use batch::{BatchFetcher, BatchRequest, FetchResult};

// Upstream clients
pub use clients::{
    BinanceCandlesParams, BinanceClient, BinanceRawCandle, BinanceRestClient, ClientError,
    CoinbaseClient, CoinbaseHistoricRatesParams, CoinbaseRawCandle, CoinbaseRestClient,
};

// Domain models
pub use domain::{AssetPair, Candle, Timeframe, UtcDateTime};

// Error types
pub use error::{ChartError, ChartErrorKind, ValidationError};

// Exchange trait
pub use exchange::{CandleFuture, CandleQuery, Exchange, IntervalParam, TimeWindow};

// Single fetch
pub use fetcher::{ChartFetcher, ChartRequest};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Registry
pub use registry::{ExchangeRegistry, ExchangeRegistryBuilder};

// Exchange identifiers
pub use source::ExchangeId;
