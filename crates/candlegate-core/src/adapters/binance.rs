use std::str::FromStr;
use std::sync::Arc;

use crate::clients::{BinanceCandlesParams, BinanceClient, BinanceRawCandle};
use crate::exchange::{CandleFuture, CandleQuery, Exchange, IntervalParam};
use crate::{AssetPair, Candle, ChartError, ExchangeId, Timeframe, UtcDateTime};

/// Binance exchange adapter over an injected [`BinanceClient`].
#[derive(Clone)]
pub struct BinanceExchange {
    client: Arc<dyn BinanceClient>,
}

impl BinanceExchange {
    pub fn new(client: Arc<dyn BinanceClient>) -> Self {
        Self { client }
    }
}

impl Exchange for BinanceExchange {
    fn id(&self) -> ExchangeId {
        ExchangeId::Binance
    }

    /// Binance symbols are base-first with no separator: `BTC-LTC` -> `LTCBTC`.
    fn format_asset(&self, pair: &AssetPair) -> String {
        format!("{}{}", pair.base(), pair.quote())
    }

    fn format_timeframe(&self, timeframe: &str) -> Result<IntervalParam, ChartError> {
        Timeframe::from_str(timeframe)
            .map(|parsed| IntervalParam::Label(parsed.as_str()))
            .map_err(|_| ChartError::unsupported_timeframe(timeframe, ExchangeId::Binance))
    }

    fn fetch_candles<'a>(&'a self, query: CandleQuery) -> CandleFuture<'a> {
        Box::pin(async move {
            let params = candles_params(query, UtcDateTime::now())?;
            let raw = self
                .client
                .candles(params)
                .await
                .map_err(|error| ChartError::upstream(error.message()))?;

            normalize_candles(&raw)
        })
    }
}

/// Native params: `endTime` defaults to `now`, both bounds overridden by the window.
fn candles_params(query: CandleQuery, now: UtcDateTime) -> Result<BinanceCandlesParams, ChartError> {
    let IntervalParam::Label(interval) = query.interval else {
        return Err(ChartError::unsupported_timeframe(
            &query.interval.to_string(),
            ExchangeId::Binance,
        ));
    };

    Ok(BinanceCandlesParams {
        symbol: query.symbol,
        interval: interval.to_owned(),
        start_time: query.window.start,
        end_time: Some(query.window.end.unwrap_or_else(|| now.unix_millis())),
    })
}

/// Converts Binance candles to canonical candles, preserving order.
///
/// The timestamp starts from `timestamp` (0 when absent) and is overwritten
/// by a non-zero `openTime`, then by a non-zero `closeTime`.
pub fn normalize_candles(raw: &[BinanceRawCandle]) -> Result<Vec<Candle>, ChartError> {
    let candles = raw
        .iter()
        .map(normalize_candle)
        .collect::<Result<Vec<_>, _>>()?;

    if candles.is_empty() {
        return Err(ChartError::unsupported_exchange(ExchangeId::Binance));
    }

    Ok(candles)
}

fn normalize_candle(raw: &BinanceRawCandle) -> Result<Candle, ChartError> {
    let mut timestamp = raw.timestamp.unwrap_or(0);
    if let Some(open_time) = raw.open_time.filter(|value| *value != 0) {
        timestamp = open_time;
    }
    if let Some(close_time) = raw.close_time.filter(|value| *value != 0) {
        timestamp = close_time;
    }

    let candle = Candle::new(
        timestamp,
        parse_field("open", &raw.open)?,
        parse_field("high", &raw.high)?,
        parse_field("low", &raw.low)?,
        parse_field("close", &raw.close)?,
        parse_field("volume", &raw.volume)?,
    )?;

    Ok(candle)
}

fn parse_field(field: &str, value: &str) -> Result<f64, ChartError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| ChartError::normalization(format!("failed to parse {field} '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ClientError;
    use crate::error::ChartErrorKind;
    use crate::exchange::TimeWindow;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    struct FakeBinanceClient {
        response: Result<Vec<BinanceRawCandle>, ClientError>,
        calls: Mutex<Vec<BinanceCandlesParams>>,
    }

    impl FakeBinanceClient {
        fn responding(response: Result<Vec<BinanceRawCandle>, ClientError>) -> Self {
            Self {
                response,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<BinanceCandlesParams> {
            self.calls.lock().expect("call log should not be poisoned").clone()
        }
    }

    impl BinanceClient for FakeBinanceClient {
        fn candles<'a>(
            &'a self,
            params: BinanceCandlesParams,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<BinanceRawCandle>, ClientError>> + Send + 'a>>
        {
            self.calls
                .lock()
                .expect("call log should not be poisoned")
                .push(params);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn raw(open_time: Option<i64>, close_time: Option<i64>, timestamp: Option<i64>) -> BinanceRawCandle {
        BinanceRawCandle {
            open: String::from("0.0163"),
            high: String::from("0.8"),
            low: String::from("0.0157"),
            close: String::from("0.0158"),
            volume: String::from("148976.11"),
            timestamp,
            open_time,
            close_time,
        }
    }

    fn exchange_with(client: Arc<FakeBinanceClient>) -> BinanceExchange {
        BinanceExchange::new(client)
    }

    fn query(window: TimeWindow) -> CandleQuery {
        CandleQuery {
            symbol: String::from("LTCBTC"),
            interval: IntervalParam::Label("1d"),
            window,
        }
    }

    #[test]
    fn formats_pair_base_first_without_separator() {
        let exchange = exchange_with(Arc::new(FakeBinanceClient::responding(Ok(Vec::new()))));
        let pair = AssetPair::parse("BTC-LTC").expect("valid pair");
        assert_eq!(exchange.format_asset(&pair), "LTCBTC");
    }

    #[test]
    fn passes_every_vocabulary_token_through() {
        let exchange = exchange_with(Arc::new(FakeBinanceClient::responding(Ok(Vec::new()))));
        for timeframe in Timeframe::ALL {
            assert_eq!(
                exchange.format_timeframe(timeframe.as_str()),
                Ok(IntervalParam::Label(timeframe.as_str()))
            );
        }
    }

    #[test]
    fn rejects_unknown_timeframe_naming_binance() {
        let exchange = exchange_with(Arc::new(FakeBinanceClient::responding(Ok(Vec::new()))));
        let error = exchange.format_timeframe("16h").expect_err("must fail");
        assert_eq!(error.kind(), ChartErrorKind::UnsupportedTimeframe);
        assert_eq!(error.message(), "Timeframe, 16h, not supported on Binance.");
    }

    #[test]
    fn close_time_wins_over_open_time_and_timestamp() {
        let candles =
            normalize_candles(&[raw(Some(1_000), Some(2_000), Some(500))]).expect("normalizes");
        assert_eq!(candles[0].timestamp, 2_000);
    }

    #[test]
    fn open_time_wins_over_timestamp() {
        let candles = normalize_candles(&[raw(Some(1_000), None, Some(500))]).expect("normalizes");
        assert_eq!(candles[0].timestamp, 1_000);
    }

    #[test]
    fn timestamp_defaults_to_zero() {
        let candles = normalize_candles(&[raw(None, None, None)]).expect("normalizes");
        assert_eq!(candles[0].timestamp, 0);

        let candles = normalize_candles(&[raw(Some(0), Some(0), Some(500))]).expect("normalizes");
        assert_eq!(candles[0].timestamp, 500);
    }

    #[test]
    fn parses_string_fields_and_preserves_order() {
        let mut second = raw(Some(2_000), None, None);
        second.close = String::from("0.0170");
        let candles =
            normalize_candles(&[raw(Some(1_000), None, None), second]).expect("normalizes");

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open, 0.0163);
        assert_eq!(candles[0].volume, 148976.11);
        assert_eq!(candles[1].timestamp, 2_000);
        assert_eq!(candles[1].close, 0.0170);
    }

    #[test]
    fn unparseable_field_fails_the_whole_batch() {
        let mut broken = raw(Some(2_000), None, None);
        broken.high = String::from("n/a");

        let error =
            normalize_candles(&[raw(Some(1_000), None, None), broken]).expect_err("must fail");
        assert_eq!(error.kind(), ChartErrorKind::NormalizationFailure);
        assert!(error.message().contains("high"));
    }

    #[test]
    fn non_finite_field_is_rejected() {
        let mut broken = raw(Some(1_000), None, None);
        broken.volume = String::from("inf");

        let error = normalize_candles(&[broken]).expect_err("must fail");
        assert_eq!(error.kind(), ChartErrorKind::NormalizationFailure);
    }

    #[test]
    fn empty_result_is_reported_as_unsupported_exchange() {
        let error = normalize_candles(&[]).expect_err("must fail");
        assert_eq!(error.kind(), ChartErrorKind::UnsupportedExchange);
        assert_eq!(error.message(), "Exchange, BINANCE, is not supported.");
    }

    #[test]
    fn end_time_defaults_to_now() {
        let now = UtcDateTime::from_unix_millis(1_700_000_000_000).expect("in range");
        let params = candles_params(query(TimeWindow::default()), now).expect("valid");

        assert_eq!(params.start_time, None);
        assert_eq!(params.end_time, Some(1_700_000_000_000));
        assert_eq!(params.interval, "1d");
    }

    #[test]
    fn window_overrides_start_and_end() {
        let now = UtcDateTime::from_unix_millis(1_700_000_000_000).expect("in range");
        let params = candles_params(query(TimeWindow::new(Some(10), Some(20))), now)
            .expect("valid");

        assert_eq!(params.start_time, Some(10));
        assert_eq!(params.end_time, Some(20));
    }

    #[tokio::test]
    async fn fetch_calls_client_once_and_normalizes() {
        let client = Arc::new(FakeBinanceClient::responding(Ok(vec![raw(
            Some(1_000),
            Some(2_000),
            None,
        )])));
        let exchange = exchange_with(client.clone());

        let candles = exchange
            .fetch_candles(query(TimeWindow::new(Some(10), None)))
            .await
            .expect("fetch succeeds");

        assert_eq!(candles.len(), 1);
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].symbol, "LTCBTC");
        assert_eq!(calls[0].start_time, Some(10));
        assert!(calls[0].end_time.is_some());
    }

    #[tokio::test]
    async fn fetch_reports_client_errors_verbatim() {
        let client = Arc::new(FakeBinanceClient::responding(Err(ClientError::new(
            "Invalid symbol.",
        ))));
        let exchange = exchange_with(client);

        let error = exchange
            .fetch_candles(query(TimeWindow::default()))
            .await
            .expect_err("must fail");
        assert_eq!(error.kind(), ChartErrorKind::UpstreamFailure);
        assert_eq!(error.message(), "Invalid symbol.");
    }
}
