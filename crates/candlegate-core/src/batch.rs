use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::fetcher::{ChartFetcher, ChartRequest};
use crate::{Candle, ChartError};

/// Batch of assets fetched from one exchange at one timeframe.
///
/// The batch path carries no time window; every asset gets the exchange
/// default range ending now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub assets: Vec<String>,
    pub exchange: String,
    pub timeframe: String,
}

/// Per-asset outcome of a batch fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FetchResult {
    Success {
        asset: String,
        data: Vec<Candle>,
        exchange: String,
        timeframe: String,
    },
    Failure {
        asset: String,
        err: String,
    },
}

impl FetchResult {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Concurrent fan-out of [`ChartFetcher`] over a batch of assets.
#[derive(Clone)]
pub struct BatchFetcher {
    fetcher: ChartFetcher,
}

impl BatchFetcher {
    pub fn new(fetcher: ChartFetcher) -> Self {
        Self { fetcher }
    }

    /// Spawns one task per asset and joins them in input order.
    ///
    /// Per-asset failures are captured in their slot. Only a worker that
    /// panics fails the whole batch.
    pub async fn fetch_batch(&self, request: BatchRequest) -> Result<Vec<FetchResult>, ChartError> {
        let BatchRequest {
            assets,
            exchange,
            timeframe,
        } = request;

        info!(
            exchange = %exchange,
            %timeframe,
            assets = assets.len(),
            "fetching chart batch"
        );

        let handles: Vec<JoinHandle<FetchResult>> = assets
            .into_iter()
            .map(|asset| {
                let fetcher = self.fetcher.clone();
                let request = ChartRequest::new(asset, exchange.clone(), timeframe.clone());
                tokio::spawn(async move { fetch_slot(&fetcher, request).await })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        let mut pending = handles.into_iter();
        while let Some(handle) = pending.next() {
            match handle.await {
                Ok(result) => results.push(result),
                Err(join_error) => {
                    error!(error = %join_error, "batch worker failed");
                    for handle in pending {
                        handle.abort();
                    }
                    return Err(ChartError::internal(format!(
                        "batch worker failed: {join_error}"
                    )));
                }
            }
        }

        Ok(results)
    }
}

async fn fetch_slot(fetcher: &ChartFetcher, request: ChartRequest) -> FetchResult {
    match fetcher.fetch(&request).await {
        Ok(data) => FetchResult::Success {
            asset: request.asset,
            data,
            exchange: request.exchange,
            timeframe: request.timeframe,
        },
        Err(error) => {
            warn!(asset = %request.asset, error = %error, "batch slot failed");
            FetchResult::Failure {
                asset: request.asset,
                err: error.to_string(),
            }
        }
    }
}
