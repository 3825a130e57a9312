use std::fmt::Formatter;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::{Error as DeError, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::{trim_base_url, ClientError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};

/// Query for the Binance candles capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinanceCandlesParams {
    pub symbol: String,
    pub interval: String,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

/// Binance candle as handed to the normalizer.
///
/// Prices and volume stay strings, the way Binance sends them. Any of the
/// three time fields may be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceRawCandle {
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_time: Option<i64>,
}

/// Binance candle capability: `candles({symbol, interval, startTime?, endTime?})`.
pub trait BinanceClient: Send + Sync {
    fn candles<'a>(
        &'a self,
        params: BinanceCandlesParams,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<BinanceRawCandle>, ClientError>> + Send + 'a>>;
}

/// Binance spot REST client for `GET /api/v3/klines`.
#[derive(Clone)]
pub struct BinanceRestClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: Option<u64>,
}

impl BinanceRestClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.binance.com";

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

    fn klines_url(&self, params: &BinanceCandlesParams) -> String {
        let mut url = format!(
            "{}/api/v3/klines?symbol={}&interval={}",
            self.base_url,
            urlencoding::encode(&params.symbol),
            urlencoding::encode(&params.interval)
        );
        if let Some(start_time) = params.start_time {
            url.push_str(&format!("&startTime={start_time}"));
        }
        if let Some(end_time) = params.end_time {
            url.push_str(&format!("&endTime={end_time}"));
        }
        url
    }
}

impl BinanceClient for BinanceRestClient {
    fn candles<'a>(
        &'a self,
        params: BinanceCandlesParams,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<BinanceRawCandle>, ClientError>> + Send + 'a>>
    {
        Box::pin(async move {
            let url = self.klines_url(&params);
            debug!(%url, "requesting binance klines");

            let request = HttpRequest::get(url).with_timeout_ms(self.timeout_ms);
            let response = self.http_client.execute(request).await?;

            if !response.is_success() {
                return Err(decode_error(&response));
            }

            let klines: Vec<BinanceKline> = serde_json::from_str(&response.body)
                .map_err(|e| ClientError::new(format!("failed to parse binance klines: {e}")))?;

            Ok(klines.into_iter().map(|kline| kline.0).collect())
        })
    }
}

#[derive(Debug, Deserialize)]
struct BinanceErrorBody {
    msg: String,
}

/// Binance reports failures as `{"code": -1121, "msg": "Invalid symbol."}`.
fn decode_error(response: &HttpResponse) -> ClientError {
    match serde_json::from_str::<BinanceErrorBody>(&response.body) {
        Ok(body) => ClientError::new(body.msg),
        Err(_) => ClientError::new(format!("binance returned status {}", response.status)),
    }
}

/// One kline row: `[openTime, open, high, low, close, volume, closeTime, ...]`.
struct BinanceKline(BinanceRawCandle);

impl<'de> Deserialize<'de> for BinanceKline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KlineVisitor;

        impl<'de> Visitor<'de> for KlineVisitor {
            type Value = BinanceKline;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("a Binance kline array with at least 7 elements")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let open_time: i64 = next_field(&mut seq, "openTime")?;
                let open = next_field(&mut seq, "open")?;
                let high = next_field(&mut seq, "high")?;
                let low = next_field(&mut seq, "low")?;
                let close = next_field(&mut seq, "close")?;
                let volume = next_field(&mut seq, "volume")?;
                let close_time: i64 = next_field(&mut seq, "closeTime")?;

                // quote volume, trade count, taker volumes, unused
                while seq.next_element::<IgnoredAny>()?.is_some() {}

                Ok(BinanceKline(BinanceRawCandle {
                    open,
                    high,
                    low,
                    close,
                    volume,
                    timestamp: None,
                    open_time: Some(open_time),
                    close_time: Some(close_time),
                }))
            }
        }

        deserializer.deserialize_seq(KlineVisitor)
    }
}

fn next_field<'de, A, T>(seq: &mut A, field: &'static str) -> Result<T, A::Error>
where
    A: SeqAccess<'de>,
    T: Deserialize<'de>,
{
    seq.next_element()?
        .ok_or_else(|| A::Error::custom(format!("kline is missing '{field}'")))
}
