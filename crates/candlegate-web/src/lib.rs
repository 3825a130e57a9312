//! # Candlegate Web
//!
//! HTTP front end for [`candlegate_core`]. Serves a single route:
//!
//! | Route | Methods | Description |
//! |-------|---------|-------------|
//! | `/charts` | `GET`, `POST` | Normalized candles for one asset or a batch |
//!
//! Parameters come from the JSON body or the query string, body first.
//! Single requests answer `{"data": [Candle]}` or `{"err": "..."}`; batch
//! requests always answer `200` with one result per asset.

pub mod config;
pub mod error;
pub mod handler;
pub mod params;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use candlegate_core::{BatchFetcher, ChartFetcher, ExchangeRegistry, ExchangeRegistryBuilder};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::ServerConfig;
pub use error::ServerError;

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: ChartFetcher,
    pub batch: BatchFetcher,
}

impl AppState {
    pub fn new(registry: ExchangeRegistry) -> Self {
        let fetcher = ChartFetcher::new(Arc::new(registry));
        Self {
            batch: BatchFetcher::new(fetcher.clone()),
            fetcher,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/charts", get(handler::charts).post(handler::charts))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Builds the exchange clients once and serves until the listener fails.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let addr = config.bind_addr()?;

    let registry = ExchangeRegistryBuilder::new()
        .with_binance_url(config.binance_url.clone())
        .with_coinbase_url(config.coinbase_url.clone())
        .with_upstream_timeout_ms(config.upstream_timeout_ms)
        .build();
    let exchanges = registry.registered();
    let app = router(AppState::new(registry));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    info!(
        %addr,
        ?exchanges,
        binance = %config.binance_url,
        coinbase = %config.coinbase_url,
        upstream_timeout_ms = ?config.upstream_timeout_ms,
        "candlegate listening"
    );

    axum::serve(listener, app).await.map_err(ServerError::Serve)
}
