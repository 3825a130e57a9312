//! Exchange adapters.
//!
//! | Adapter | Symbol | Timeframe encoding |
//! |---------|--------|--------------------|
//! | [`BinanceExchange`] | `LTCBTC` | label, full vocabulary |
//! | [`CoinbaseExchange`] | `LTC-BTC` | seconds, `1m 5m 15m 1h 1d` only |

pub mod binance;
pub mod coinbase;

pub use binance::BinanceExchange;
pub use coinbase::CoinbaseExchange;
