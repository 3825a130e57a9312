//! Contract tests every exchange adapter must satisfy.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use candlegate_core::{
    AssetPair, BinanceCandlesParams, BinanceClient, BinanceExchange, BinanceRawCandle,
    CandleQuery, ChartErrorKind, ClientError, CoinbaseClient, CoinbaseExchange,
    CoinbaseHistoricRatesParams, CoinbaseRawCandle, Exchange, ExchangeId, ExchangeRegistryBuilder,
    HttpClient, HttpError, HttpRequest, HttpResponse, TimeWindow, Timeframe,
};

type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<Vec<T>, ClientError>> + Send + 'a>>;

struct CountingBinance(AtomicUsize);

impl BinanceClient for CountingBinance {
    fn candles<'a>(&'a self, _params: BinanceCandlesParams) -> ClientFuture<'a, BinanceRawCandle> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(Vec::new()) })
    }
}

struct CountingCoinbase(AtomicUsize);

impl CoinbaseClient for CountingCoinbase {
    fn product_historic_rates<'a>(
        &'a self,
        _product_id: String,
        _params: CoinbaseHistoricRatesParams,
    ) -> ClientFuture<'a, CoinbaseRawCandle> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(Vec::new()) })
    }
}

fn adapters() -> Vec<Arc<dyn Exchange>> {
    vec![
        Arc::new(BinanceExchange::new(Arc::new(CountingBinance(AtomicUsize::new(0))))),
        Arc::new(CoinbaseExchange::new(Arc::new(CountingCoinbase(AtomicUsize::new(0))))),
    ]
}

/// Transport that answers every request with the same canned response.
struct CannedHttpClient(HttpResponse);

impl HttpClient for CannedHttpClient {
    fn execute<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self.0.clone();
        Box::pin(async move { Ok(response) })
    }
}

#[test]
fn asset_formatting_is_pure_and_exchange_specific() {
    let pair = AssetPair::parse("BTC-LTC").expect("valid pair");

    for exchange in adapters() {
        let first = exchange.format_asset(&pair);
        let second = exchange.format_asset(&pair);
        assert_eq!(first, second, "{} formatting must be pure", exchange.id());

        let expected = match exchange.id() {
            ExchangeId::Binance => "LTCBTC",
            ExchangeId::Coinbase => "LTC-BTC",
        };
        assert_eq!(first, expected);
    }
}

#[test]
fn every_adapter_names_itself_in_timeframe_errors() {
    for exchange in adapters() {
        let error = exchange.format_timeframe("16h").expect_err("16h is never supported");
        assert_eq!(error.kind(), ChartErrorKind::UnsupportedTimeframe);
        assert_eq!(
            error.message(),
            format!("Timeframe, 16h, not supported on {}.", exchange.id().label())
        );
    }
}

#[test]
fn binance_serves_the_whole_vocabulary_and_coinbase_five_tokens() {
    let adapters = adapters();
    let supported = |exchange: &Arc<dyn Exchange>| {
        Timeframe::ALL
            .iter()
            .filter(|timeframe| exchange.format_timeframe(timeframe.as_str()).is_ok())
            .count()
    };

    assert_eq!(supported(&adapters[0]), Timeframe::ALL.len());
    assert_eq!(supported(&adapters[1]), 5);
}

#[test]
fn timeframe_tokens_are_case_sensitive() {
    for exchange in adapters() {
        let minute = exchange.format_timeframe("1m").expect("1m supported everywhere");
        let month = exchange.format_timeframe("1M");
        assert_ne!(Ok(minute), month, "1m and 1M must never collapse");
    }
}

#[tokio::test]
async fn rest_backed_registry_reports_non_success_statuses_per_exchange() {
    let http: Arc<dyn HttpClient> = Arc::new(CannedHttpClient(HttpResponse::new(
        404,
        r#"{"message":"NotFound"}"#,
    )));
    let registry = ExchangeRegistryBuilder::new().with_http_client(http).build();

    let coinbase = registry.get(ExchangeId::Coinbase).expect("registered");
    let query = CandleQuery {
        symbol: String::from("XXX-BTC"),
        interval: coinbase.format_timeframe("1d").expect("1d supported"),
        window: TimeWindow::default(),
    };
    let error = coinbase.fetch_candles(query).await.expect_err("must fail");
    assert_eq!(error.to_string(), "HTTP 404 Error: NotFound");

    let binance = registry.get(ExchangeId::Binance).expect("registered");
    let query = CandleQuery {
        symbol: String::from("XXXBTC"),
        interval: binance.format_timeframe("1d").expect("1d supported"),
        window: TimeWindow::default(),
    };
    let error = binance.fetch_candles(query).await.expect_err("must fail");
    assert_eq!(error.to_string(), "binance returned status 404");
}
