//! Server configuration.
//!
//! Every option can be given as a flag or through the environment.
//!
//! | Option | Environment | Default |
//! |--------|-------------|---------|
//! | `--bind` | `CANDLEGATE_BIND` | `127.0.0.1:8080` |
//! | `--binance-url` | `CANDLEGATE_BINANCE_URL` | `https://api.binance.com` |
//! | `--coinbase-url` | `CANDLEGATE_COINBASE_URL` | `https://api.exchange.coinbase.com` |
//! | `--upstream-timeout-ms` | `CANDLEGATE_UPSTREAM_TIMEOUT_MS` | none |
//! | `--log-filter` | `RUST_LOG` | `candlegate=info,tower_http=info` |

use std::net::SocketAddr;

use candlegate_core::{BinanceRestClient, CoinbaseRestClient};
use clap::Parser;

use crate::error::ServerError;

pub const DEFAULT_LOG_FILTER: &str = "candlegate=info,tower_http=info";

/// Normalized OHLCV candles from Binance and Coinbase over one endpoint.
#[derive(Debug, Clone, Parser)]
#[command(name = "candlegate", author, version, about)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[arg(long, env = "CANDLEGATE_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Binance REST base URL.
    #[arg(long, env = "CANDLEGATE_BINANCE_URL", default_value = BinanceRestClient::DEFAULT_BASE_URL)]
    pub binance_url: String,

    /// Coinbase Exchange REST base URL.
    #[arg(long, env = "CANDLEGATE_COINBASE_URL", default_value = CoinbaseRestClient::DEFAULT_BASE_URL)]
    pub coinbase_url: String,

    /// Per-request upstream timeout in milliseconds. Unset waits indefinitely.
    #[arg(long, env = "CANDLEGATE_UPSTREAM_TIMEOUT_MS")]
    pub upstream_timeout_ms: Option<u64>,

    /// tracing-subscriber filter directives.
    #[arg(long, env = "RUST_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, ServerError> {
        self.bind
            .parse()
            .map_err(|source| ServerError::InvalidBindAddress {
                value: self.bind.clone(),
                source,
            })
    }
}
