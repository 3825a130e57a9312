//! `/charts` parameter extraction.
//!
//! Fields are read from the body first and the query string second. The
//! body may be JSON or `application/x-www-form-urlencoded`. Empty strings
//! are treated as absent everywhere.

use std::collections::HashMap;

use candlegate_core::{BatchRequest, ChartError, ChartRequest};
use serde_json::{Map, Value};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

pub const ERR_NO_EXCHANGE: &str = "An exchange is required: 'Binance' || 'Coinbase'.";
pub const ERR_NO_ASSET: &str = "An asset is required: 'BTC-LTC' || 'USDT-BTC' || ...";
pub const ERR_NO_TIMEFRAME: &str = "A timeframe is required: '1m' || '5m' || '15m' || \
'30m' || '1h' || '4h' || '1d' || '1w' || '1M'";

/// Parsed `/charts` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartCall {
    Single(ChartRequest),
    Batch(BatchRequest),
}

/// Raw request fields before validation.
#[derive(Debug, Clone, Default)]
pub struct RawParams {
    body: Map<String, Value>,
    query: HashMap<String, String>,
}

impl RawParams {
    /// An empty body is accepted. Form bodies are decoded when the content
    /// type says so; any other body must be a JSON object.
    pub fn from_parts(
        query: HashMap<String, String>,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<Self, ChartError> {
        let body = if body.iter().all(u8::is_ascii_whitespace) {
            Map::new()
        } else if content_type.is_some_and(is_form) {
            parse_form(body)?
        } else {
            match serde_json::from_slice::<Value>(body) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(ChartError::invalid_parameter(
                        "request body must be a JSON object",
                    ))
                }
                Err(e) => {
                    return Err(ChartError::invalid_parameter(format!(
                        "request body is not valid JSON: {e}"
                    )))
                }
            }
        };

        Ok(Self { body, query })
    }

    fn text(&self, name: &str) -> Option<String> {
        let from_body = self.body.get(name).and_then(|value| match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        });

        from_body
            .filter(|text| !text.is_empty())
            .or_else(|| self.query.get(name).filter(|text| !text.is_empty()).cloned())
    }

    /// Unix milliseconds given as an integer or an integer string.
    fn millis(&self, name: &str) -> Result<Option<i64>, ChartError> {
        let Some(text) = self.text(name) else {
            return Ok(None);
        };

        let millis = text.trim().parse::<i64>().map_err(|_| {
            ChartError::invalid_parameter(format!(
                "{name} must be a Unix timestamp in milliseconds: '{text}'"
            ))
        })?;

        // zero means "not given"
        Ok(Some(millis).filter(|millis| *millis != 0))
    }

    /// Validates presence of the required fields and builds the call.
    ///
    /// Presence is checked in order exchange, asset, timeframe. When both
    /// `assets` and `asset` are given the batch path wins.
    pub fn into_call(self) -> Result<ChartCall, ChartError> {
        let exchange = self
            .text("exchange")
            .ok_or_else(|| ChartError::missing_parameter(ERR_NO_EXCHANGE))?
            .to_ascii_uppercase();
        let asset = self.text("asset");
        let assets = self.text("assets");
        if asset.is_none() && assets.is_none() {
            return Err(ChartError::missing_parameter(ERR_NO_ASSET));
        }
        let timeframe = self
            .text("timeframe")
            .ok_or_else(|| ChartError::missing_parameter(ERR_NO_TIMEFRAME))?;

        if let Some(assets) = assets {
            let assets = assets
                .split(',')
                .map(|asset| asset.trim().to_ascii_uppercase())
                .collect();
            return Ok(ChartCall::Batch(BatchRequest {
                assets,
                exchange,
                timeframe,
            }));
        }

        let start = self.millis("start")?;
        let end = self.millis("end")?;
        let asset = asset.unwrap_or_default().to_ascii_uppercase();

        Ok(ChartCall::Single(
            ChartRequest::new(asset, exchange, timeframe).with_window(start, end),
        ))
    }
}

fn is_form(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// Decodes `a=1&b=2` pairs; `+` stands for a space. A repeated key keeps
/// its last value.
fn parse_form(body: &[u8]) -> Result<Map<String, Value>, ChartError> {
    let body = std::str::from_utf8(body)
        .map_err(|_| ChartError::invalid_parameter("form body is not valid UTF-8"))?;

    let mut fields = Map::new();
    for pair in body.trim().split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        fields.insert(decode_form_component(key)?, Value::String(decode_form_component(value)?));
    }
    Ok(fields)
}

fn decode_form_component(raw: &str) -> Result<String, ChartError> {
    urlencoding::decode(&raw.replace('+', " "))
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ChartError::invalid_parameter(format!("form field is not valid UTF-8: '{raw}'")))
}
