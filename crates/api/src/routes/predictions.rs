//! Prediction Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::RawPropertyInput;
use metrics::{counter, histogram};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error};

use crate::AppState;

/// Successful estimate
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub price: f64,
    /// Price with thousands separators and two decimals
    pub formatted: String,
}

/// Per-field validation messages
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub errors: BTreeMap<&'static str, String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Validate a raw request and estimate its price
pub async fn create_prediction(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawPropertyInput>, JsonRejection>,
) -> Response {
    let Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            debug!("Unreadable request body: {}", rejection.body_text());
            counter!("prediction_rejections_total").increment(1);
            return (
                rejection.status(),
                Json(ErrorResponse {
                    error: "request body must be a JSON object".to_string(),
                }),
            )
                .into_response();
        }
    };

    let attrs = match state.validator.validate(&input) {
        Ok(attrs) => attrs,
        Err(errors) => {
            counter!("prediction_rejections_total").increment(1);
            let errors = errors.iter().map(|e| (e.field(), e.to_string())).collect();
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(ValidationResponse { errors })).into_response();
        }
    };

    let start = std::time::Instant::now();
    match state.pipeline.predict(&attrs) {
        Ok(price) => {
            let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
            counter!("predictions_total").increment(1);
            histogram!("prediction_latency_ms").record(latency_ms);
            debug!("Prediction {:.2} in {:.3}ms", price, latency_ms);

            Json(PredictionResponse {
                price,
                formatted: format_price(price),
            })
            .into_response()
        }
        Err(e) => {
            // Artifact details stay in the log
            error!("Prediction failed: {}", e);
            counter!("prediction_failures_total").increment(1);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "prediction failed".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Format a price as `1,234,567.89`
pub fn format_price(price: f64) -> String {
    let fixed = format!("{:.2}", price.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if price < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}
