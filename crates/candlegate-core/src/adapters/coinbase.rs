use std::sync::Arc;

use crate::clients::{CoinbaseClient, CoinbaseHistoricRatesParams, CoinbaseRawCandle};
use crate::exchange::{CandleFuture, CandleQuery, Exchange, IntervalParam, TimeWindow};
use crate::{AssetPair, Candle, ChartError, ExchangeId, UtcDateTime};

/// Coinbase exchange adapter over an injected [`CoinbaseClient`].
#[derive(Clone)]
pub struct CoinbaseExchange {
    client: Arc<dyn CoinbaseClient>,
}

impl CoinbaseExchange {
    pub fn new(client: Arc<dyn CoinbaseClient>) -> Self {
        Self { client }
    }
}

/// Coinbase only serves these candle widths.
fn granularity_seconds(timeframe: &str) -> Option<u32> {
    match timeframe {
        "1m" => Some(60),
        "5m" => Some(300),
        "15m" => Some(900),
        "1h" => Some(3_600),
        "1d" => Some(86_400),
        _ => None,
    }
}

impl Exchange for CoinbaseExchange {
    fn id(&self) -> ExchangeId {
        ExchangeId::Coinbase
    }

    /// Coinbase products are base-first with a dash: `BTC-LTC` -> `LTC-BTC`.
    fn format_asset(&self, pair: &AssetPair) -> String {
        format!("{}-{}", pair.base(), pair.quote())
    }

    fn format_timeframe(&self, timeframe: &str) -> Result<IntervalParam, ChartError> {
        granularity_seconds(timeframe)
            .map(IntervalParam::Seconds)
            .ok_or_else(|| ChartError::unsupported_timeframe(timeframe, ExchangeId::Coinbase))
    }

    fn fetch_candles<'a>(&'a self, query: CandleQuery) -> CandleFuture<'a> {
        Box::pin(async move {
            let params = historic_rates_params(query.interval, query.window, UtcDateTime::now())?;
            let raw = self
                .client
                .product_historic_rates(query.symbol, params)
                .await
                .map_err(|error| ChartError::upstream(error.message()))?;

            normalize_candles(&raw)
        })
    }
}

/// Native params: `end` defaults to `now`, window bounds become ISO-8601 strings.
fn historic_rates_params(
    interval: IntervalParam,
    window: TimeWindow,
    now: UtcDateTime,
) -> Result<CoinbaseHistoricRatesParams, ChartError> {
    let IntervalParam::Seconds(granularity) = interval else {
        return Err(ChartError::unsupported_timeframe(
            &interval.to_string(),
            ExchangeId::Coinbase,
        ));
    };

    let start = window.start.map(iso8601_from_millis).transpose()?;
    let end = match window.end {
        Some(millis) => iso8601_from_millis(millis)?,
        None => now.format_iso8601()?,
    };

    Ok(CoinbaseHistoricRatesParams {
        start,
        end: Some(end),
        granularity,
    })
}

fn iso8601_from_millis(millis: i64) -> Result<String, ChartError> {
    Ok(UtcDateTime::from_unix_millis(millis)?.format_iso8601()?)
}

/// Converts Coinbase tuples `[time, low, high, open, close, volume]` to
/// canonical candles, preserving order. Seconds become milliseconds.
pub fn normalize_candles(raw: &[CoinbaseRawCandle]) -> Result<Vec<Candle>, ChartError> {
    let candles = raw
        .iter()
        .map(|CoinbaseRawCandle(time, low, high, open, close, volume)| {
            let timestamp = time.checked_mul(1_000).ok_or_else(|| {
                ChartError::normalization(format!("candle time {time} overflows milliseconds"))
            })?;
            Ok(Candle::new(timestamp, *open, *high, *low, *close, *volume)?)
        })
        .collect::<Result<Vec<_>, ChartError>>()?;

    if candles.is_empty() {
        return Err(ChartError::unsupported_exchange(ExchangeId::Coinbase));
    }

    Ok(candles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ClientError;
    use crate::error::ChartErrorKind;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    struct FakeCoinbaseClient {
        response: Result<Vec<CoinbaseRawCandle>, ClientError>,
        calls: Mutex<Vec<(String, CoinbaseHistoricRatesParams)>>,
    }

    impl FakeCoinbaseClient {
        fn responding(response: Result<Vec<CoinbaseRawCandle>, ClientError>) -> Self {
            Self {
                response,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, CoinbaseHistoricRatesParams)> {
            self.calls.lock().expect("call log should not be poisoned").clone()
        }
    }

    impl CoinbaseClient for FakeCoinbaseClient {
        fn product_historic_rates<'a>(
            &'a self,
            product_id: String,
            params: CoinbaseHistoricRatesParams,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<CoinbaseRawCandle>, ClientError>> + Send + 'a>>
        {
            self.calls
                .lock()
                .expect("call log should not be poisoned")
                .push((product_id, params));
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn exchange() -> CoinbaseExchange {
        CoinbaseExchange::new(Arc::new(FakeCoinbaseClient::responding(Ok(Vec::new()))))
    }

    fn now() -> UtcDateTime {
        UtcDateTime::from_unix_millis(1_515_110_400_000).expect("in range")
    }

    #[test]
    fn formats_pair_base_first_with_dash() {
        let pair = AssetPair::parse("BTC-LTC").expect("valid pair");
        assert_eq!(exchange().format_asset(&pair), "LTC-BTC");
    }

    #[test]
    fn maps_supported_timeframes_to_seconds() {
        let exchange = exchange();
        let expected = [
            ("1m", 60),
            ("5m", 300),
            ("15m", 900),
            ("1h", 3_600),
            ("1d", 86_400),
        ];
        for (timeframe, seconds) in expected {
            assert_eq!(
                exchange.format_timeframe(timeframe),
                Ok(IntervalParam::Seconds(seconds))
            );
        }
    }

    #[test]
    fn rejects_timeframes_coinbase_does_not_serve() {
        let exchange = exchange();
        for timeframe in ["30m", "4h", "1w", "1M", "16h"] {
            let error = exchange.format_timeframe(timeframe).expect_err("must fail");
            assert_eq!(error.kind(), ChartErrorKind::UnsupportedTimeframe);
            assert_eq!(
                error.message(),
                format!("Timeframe, {timeframe}, not supported on Coinbase.")
            );
        }
    }

    #[test]
    fn reorders_tuple_fields_and_scales_time() {
        let candles = normalize_candles(&[CoinbaseRawCandle(
            1_514_764_800,
            0.0171,
            0.0182,
            0.0175,
            0.018,
            1234.5,
        )])
        .expect("normalizes");

        assert_eq!(
            candles,
            vec![Candle {
                timestamp: 1_514_764_800_000,
                open: 0.0175,
                high: 0.0182,
                low: 0.0171,
                close: 0.018,
                volume: 1234.5,
            }]
        );
    }

    #[test]
    fn preserves_upstream_order() {
        let candles = normalize_candles(&[
            CoinbaseRawCandle(20, 1.0, 1.0, 1.0, 1.0, 1.0),
            CoinbaseRawCandle(10, 1.0, 1.0, 1.0, 1.0, 1.0),
        ])
        .expect("normalizes");

        assert_eq!(candles[0].timestamp, 20_000);
        assert_eq!(candles[1].timestamp, 10_000);
    }

    #[test]
    fn empty_result_is_reported_as_unsupported_exchange() {
        let error = normalize_candles(&[]).expect_err("must fail");
        assert_eq!(error.kind(), ChartErrorKind::UnsupportedExchange);
        assert_eq!(error.message(), "Exchange, COINBASE, is not supported.");
    }

    #[test]
    fn end_defaults_to_now_as_iso8601() {
        let params = historic_rates_params(IntervalParam::Seconds(86_400), TimeWindow::default(), now())
            .expect("valid");

        assert_eq!(params.start, None);
        assert_eq!(params.end.as_deref(), Some("2018-01-05T00:00:00.000Z"));
        assert_eq!(params.granularity, 86_400);
    }

    #[test]
    fn window_bounds_are_converted_to_iso8601() {
        let window = TimeWindow::new(Some(1_514_764_800_000), Some(1_514_851_200_000));
        let params = historic_rates_params(IntervalParam::Seconds(3_600), window, now())
            .expect("valid");

        assert_eq!(params.start.as_deref(), Some("2018-01-01T00:00:00.000Z"));
        assert_eq!(params.end.as_deref(), Some("2018-01-02T00:00:00.000Z"));
    }

    #[test]
    fn out_of_range_window_is_an_invalid_parameter() {
        let window = TimeWindow::new(Some(i64::MAX), None);
        let error = historic_rates_params(IntervalParam::Seconds(60), window, now())
            .expect_err("must fail");
        assert_eq!(error.kind(), ChartErrorKind::InvalidParameter);
    }

    #[tokio::test]
    async fn fetch_sends_product_id_and_granularity() {
        let client = Arc::new(FakeCoinbaseClient::responding(Ok(vec![CoinbaseRawCandle(
            1_514_764_800,
            1.0,
            2.0,
            1.5,
            1.8,
            10.0,
        )])));
        let exchange = CoinbaseExchange::new(client.clone());

        let candles = exchange
            .fetch_candles(CandleQuery {
                symbol: String::from("LTC-BTC"),
                interval: IntervalParam::Seconds(86_400),
                window: TimeWindow::default(),
            })
            .await
            .expect("fetch succeeds");

        assert_eq!(candles.len(), 1);
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "LTC-BTC");
        assert_eq!(calls[0].1.granularity, 86_400);
        assert!(calls[0].1.end.is_some());
    }

    #[tokio::test]
    async fn fetch_reports_client_errors_verbatim() {
        let client = Arc::new(FakeCoinbaseClient::responding(Err(ClientError::new(
            "HTTP 404 Error: NotFound",
        ))));
        let exchange = CoinbaseExchange::new(client);

        let error = exchange
            .fetch_candles(CandleQuery {
                symbol: String::from("XXX-BTC"),
                interval: IntervalParam::Seconds(86_400),
                window: TimeWindow::default(),
            })
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), ChartErrorKind::UpstreamFailure);
        assert_eq!(error.message(), "HTTP 404 Error: NotFound");
    }
}
