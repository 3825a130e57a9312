//! Exchange trait and the exchange-neutral query types.
//!
//! Every supported exchange implements [`Exchange`]. The chart fetcher looks
//! an implementation up once per request and drives it through the same
//! four steps regardless of which exchange it is:
//!
//! 1. [`format_asset`](Exchange::format_asset) turns `QUOTE-BASE` into the exchange symbol
//! 2. [`format_timeframe`](Exchange::format_timeframe) validates the timeframe and maps it
//! 3. [`fetch_candles`](Exchange::fetch_candles) performs one upstream call
//! 4. the implementation normalizes the raw payload into [`Candle`]s

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{AssetPair, Candle, ChartError, ExchangeId};

/// Exchange-native encoding of a timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalParam {
    /// Interval label sent as-is, e.g. Binance `1d`.
    Label(&'static str),
    /// Candle width in seconds, e.g. Coinbase `86400`.
    Seconds(u32),
}

impl Display for IntervalParam {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Label(label) => f.write_str(label),
            Self::Seconds(seconds) => write!(f, "{seconds}"),
        }
    }
}

/// Optional request window in Unix epoch milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl TimeWindow {
    pub const fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self { start, end }
    }
}

/// Fully formatted candle query handed to an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleQuery {
    pub symbol: String,
    pub interval: IntervalParam,
    pub window: TimeWindow,
}

pub type CandleFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Candle>, ChartError>> + Send + 'a>>;

/// Exchange capability contract.
///
/// Implementations must be `Send + Sync`; a single instance is shared by all
/// concurrent requests.
pub trait Exchange: Send + Sync {
    /// Returns the exchange identifier used for registry lookup.
    fn id(&self) -> ExchangeId;

    /// Encodes a pair as the exchange symbol. Never checks that it is listed.
    fn format_asset(&self, pair: &AssetPair) -> String;

    /// Maps a timeframe token to the exchange encoding.
    ///
    /// # Errors
    ///
    /// Returns an `UnsupportedTimeframe` [`ChartError`] naming the token and
    /// the exchange when the token is outside the exchange's vocabulary.
    fn format_timeframe(&self, timeframe: &str) -> Result<IntervalParam, ChartError>;

    /// Performs exactly one upstream call and normalizes the result.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamFailure` with the client message verbatim when the
    /// call fails, `NormalizationFailure` for malformed candles and
    /// `UnsupportedExchange` when the upstream returns no candles.
    fn fetch_candles<'a>(&'a self, query: CandleQuery) -> CandleFuture<'a>;
}
