//! Prediction handler

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{sanitize_text, AppError, AppState, MAX_BODY_SIZE, MAX_INPUT_BYTES};
use tally_core::PredictionResult;

/// Request body for POST /api/predict
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(alias = "expense")]
    pub text: String,
}

/// Response: the sanitized text plus one key per role and `amount`
#[derive(Serialize)]
pub struct PredictResponse {
    pub text: String,
    #[serde(flatten)]
    pub result: PredictionResult,
}

/// POST /api/predict - Classify one description
pub async fn predict(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<PredictResponse>, AppError> {
    // Extract JSON body
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Request body too large"))?;
    let req: PredictRequest =
        serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))?;

    if req.text.len() > MAX_INPUT_BYTES {
        return Err(AppError::bad_request(&format!(
            "Input too long (max {} bytes)",
            MAX_INPUT_BYTES
        )));
    }

    let text = sanitize_text(&req.text);
    if text != req.text {
        debug!(original_len = req.text.len(), "Sanitized prediction input");
    }

    let result = state.predictor.predict(&text)?;

    Ok(Json(PredictResponse { text, result }))
}
