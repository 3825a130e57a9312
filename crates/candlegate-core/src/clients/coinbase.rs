use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{trim_base_url, ClientError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, USER_AGENT};

/// Query for the Coinbase historic rates capability.
///
/// `start` and `end` are ISO-8601 strings; `granularity` is in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinbaseHistoricRatesParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub granularity: u32,
}

/// Coinbase candle tuple `[time, low, high, open, close, volume]`, time in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoinbaseRawCandle(pub i64, pub f64, pub f64, pub f64, pub f64, pub f64);

/// Coinbase candle capability: `getProductHistoricRates(productId, params)`.
pub trait CoinbaseClient: Send + Sync {
    fn product_historic_rates<'a>(
        &'a self,
        product_id: String,
        params: CoinbaseHistoricRatesParams,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CoinbaseRawCandle>, ClientError>> + Send + 'a>>;
}

/// Coinbase Exchange REST client for `GET /products/{id}/candles`.
#[derive(Clone)]
pub struct CoinbaseRestClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: Option<u64>,
}

impl CoinbaseRestClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.exchange.coinbase.com";

    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: trim_base_url(base_url),
            timeout_ms: None,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn candles_url(&self, product_id: &str, params: &CoinbaseHistoricRatesParams) -> String {
        let mut url = format!(
            "{}/products/{}/candles?granularity={}",
            self.base_url,
            urlencoding::encode(product_id),
            params.granularity
        );
        if let Some(start) = &params.start {
            url.push_str(&format!("&start={}", urlencoding::encode(start)));
        }
        if let Some(end) = &params.end {
            url.push_str(&format!("&end={}", urlencoding::encode(end)));
        }
        url
    }
}

impl CoinbaseClient for CoinbaseRestClient {
    fn product_historic_rates<'a>(
        &'a self,
        product_id: String,
        params: CoinbaseHistoricRatesParams,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CoinbaseRawCandle>, ClientError>> + Send + 'a>>
    {
        Box::pin(async move {
            let url = self.candles_url(&product_id, &params);
            debug!(%url, "requesting coinbase candles");

            // Coinbase rejects requests without a user agent.
            let request = HttpRequest::get(url)
                .with_header("user-agent", USER_AGENT)
                .with_timeout_ms(self.timeout_ms);
            let response = self.http_client.execute(request).await?;

            if !response.is_success() {
                return Err(decode_error(&response));
            }

            serde_json::from_str(&response.body)
                .map_err(|e| ClientError::new(format!("failed to parse coinbase candles: {e}")))
        })
    }
}

#[derive(Debug, Deserialize)]
struct CoinbaseErrorBody {
    message: String,
}

/// Coinbase reports failures as `{"message": "NotFound"}`.
fn decode_error(response: &HttpResponse) -> ClientError {
    match serde_json::from_str::<CoinbaseErrorBody>(&response.body) {
        Ok(body) => ClientError::new(format!(
            "HTTP {} Error: {}",
            response.status, body.message
        )),
        Err(_) => ClientError::new(format!("coinbase returned status {}", response.status)),
    }
}
