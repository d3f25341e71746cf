// Prediction handlers — the public classification surface.
//
// Two flavors over the same classification path:
//   POST /api/predict (JSON body) → full verdict as JSON
//   POST /predict     (form body) → verdict plus the classification sentence
//
// Both go through `model::classify`, which runs the shared extractor. There
// is no second feature pipeline for serving.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;
use tracing::debug;

use crate::model;
use crate::web::{api_error, AppState};

#[derive(Deserialize)]
pub struct PredictRequest {
    pub url: String,
}

/// POST /api/predict — classify a URL, JSON in / JSON out.
pub async fn predict_json(
    State(state): State<AppState>,
    Json(body): Json<PredictRequest>,
) -> Response {
    match classify_url(&state, &body.url).await {
        Ok(verdict) => (StatusCode::OK, Json(verdict)).into_response(),
        Err(resp) => resp,
    }
}

/// POST /predict — form-encoded flavor for plain HTML clients. Returns the
/// verdict with the human-readable sentence alongside.
pub async fn predict_form(
    State(state): State<AppState>,
    Form(body): Form<PredictRequest>,
) -> Response {
    match classify_url(&state, &body.url).await {
        Ok(verdict) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "result": verdict.sentence(),
                "label": verdict.label,
                "phishing": verdict.phishing,
                "confidence": verdict.confidence,
            })),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

async fn classify_url(state: &AppState, url: &str) -> Result<model::Verdict, Response> {
    if url.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "URL must not be empty"));
    }

    let Some(active) = state.model.current().await else {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "No model loaded — train one first",
        ));
    };

    let verdict = model::classify(active.as_ref(), url);
    debug!(url, label = verdict.label, confidence = verdict.confidence, "Classified URL");
    Ok(verdict)
}
