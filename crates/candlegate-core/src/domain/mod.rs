//! # Domain Models
//!
//! Exchange-neutral domain types for candle requests and responses.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`AssetPair`] | `QUOTE-BASE` trading pair |
//! | [`Timeframe`] | Candle timeframe token (1m .. 1M) |
//! | [`Candle`] | Canonical OHLCV candle with a millisecond timestamp |
//! | [`UtcDateTime`] | UTC timestamp with ISO-8601 formatting |
//!
//! ## Validation
//!
//! Construction enforces invariants, so a value that exists is valid:
//!
//! ```rust
//! use candlegate_core::{AssetPair, Candle, ValidationError};
//!
//! let pair = AssetPair::parse("btc-ltc").unwrap();
//! assert_eq!(pair.base(), "LTC");
//!
//! let invalid = Candle::new(0, 1.0, f64::NAN, 0.5, 1.0, 2.0);
//! assert!(matches!(invalid, Err(ValidationError::NonFiniteValue { field: "high" })));
//! ```

mod asset;
mod candle;
mod timeframe;
mod timestamp;

pub use asset::AssetPair;
pub use candle::Candle;
pub use timeframe::Timeframe;
pub use timestamp::UtcDateTime;
