use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use candlegate_core::{Candle, ChartError, ChartErrorKind, FetchResult};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::params::{ChartCall, RawParams};
use crate::AppState;

/// `/charts` response body: `{"data": ...}` or `{"err": "..."}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChartsResponse {
    Candles { data: Vec<Candle> },
    Batch { data: Vec<FetchResult> },
    Error { err: String },
}

/// Validation errors answer 404, the status the service has always used for
/// client mistakes.
pub fn status_for(error: &ChartError) -> StatusCode {
    if error.is_validation() {
        return StatusCode::NOT_FOUND;
    }
    match error.kind() {
        ChartErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn error_response(error: &ChartError) -> Response {
    (
        status_for(error),
        Json(ChartsResponse::Error {
            err: error.to_string(),
        }),
    )
        .into_response()
}

/// `GET|POST /charts`
pub async fn charts(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = Uuid::new_v4();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let call = match RawParams::from_parts(query, content_type, &body).and_then(RawParams::into_call)
    {
        Ok(call) => call,
        Err(error) => {
            info!(%request_id, code = error.code(), error = %error, "rejected chart request");
            return error_response(&error);
        }
    };

    match call {
        ChartCall::Single(request) => {
            info!(
                %request_id,
                exchange = %request.exchange,
                asset = %request.asset,
                timeframe = %request.timeframe,
                "chart request"
            );
            match state.fetcher.fetch(&request).await {
                Ok(data) => (StatusCode::OK, Json(ChartsResponse::Candles { data })).into_response(),
                Err(error) => error_response(&error),
            }
        }
        ChartCall::Batch(request) => {
            info!(
                %request_id,
                exchange = %request.exchange,
                timeframe = %request.timeframe,
                assets = request.assets.len(),
                "chart batch request"
            );
            match state.batch.fetch_batch(request).await {
                Ok(data) => {
                    let failed = data.iter().filter(|slot| !slot.is_success()).count();
                    if failed > 0 {
                        warn!(%request_id, failed, "chart batch completed with failures");
                    }
                    (StatusCode::OK, Json(ChartsResponse::Batch { data })).into_response()
                }
                Err(error) => error_response(&error),
            }
        }
    }
}
