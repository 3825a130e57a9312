use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::exchange::{CandleQuery, TimeWindow};
use crate::registry::ExchangeRegistry;
use crate::{AssetPair, Candle, ChartError, ExchangeId};

/// Single-chart request as received from the caller, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub asset: String,
    pub exchange: String,
    pub timeframe: String,
    pub window: TimeWindow,
}

impl ChartRequest {
    pub fn new(
        asset: impl Into<String>,
        exchange: impl Into<String>,
        timeframe: impl Into<String>,
    ) -> Self {
        Self {
            asset: asset.into(),
            exchange: exchange.into(),
            timeframe: timeframe.into(),
            window: TimeWindow::default(),
        }
    }

    pub fn with_window(mut self, start: Option<i64>, end: Option<i64>) -> Self {
        self.window = TimeWindow::new(start, end);
        self
    }
}

/// Fetches and normalizes candles for one asset pair.
///
/// Validation happens in a fixed order: exchange, asset pair, timeframe.
/// Any validation failure returns before the upstream client is touched.
#[derive(Clone)]
pub struct ChartFetcher {
    registry: Arc<ExchangeRegistry>,
}

impl ChartFetcher {
    pub fn new(registry: Arc<ExchangeRegistry>) -> Self {
        Self { registry }
    }

    pub async fn fetch(&self, request: &ChartRequest) -> Result<Vec<Candle>, ChartError> {
        let exchange_id = ExchangeId::from_str(&request.exchange)?;
        let exchange = self.registry.get(exchange_id)?;

        let pair = AssetPair::parse(&request.asset)?;
        let symbol = exchange.format_asset(&pair);
        let interval = exchange.format_timeframe(request.timeframe.trim())?;

        debug!(
            exchange = %exchange_id,
            asset = %pair,
            %symbol,
            %interval,
            start = ?request.window.start,
            end = ?request.window.end,
            "fetching candles"
        );

        let query = CandleQuery {
            symbol,
            interval,
            window: request.window,
        };

        match exchange.fetch_candles(query).await {
            Ok(candles) => {
                debug!(
                    exchange = %exchange_id,
                    asset = %pair,
                    count = candles.len(),
                    "candles normalized"
                );
                Ok(candles)
            }
            Err(error) => {
                warn!(
                    exchange = %exchange_id,
                    asset = %pair,
                    code = error.code(),
                    error = %error,
                    "chart fetch failed"
                );
                Err(error)
            }
        }
    }
}
