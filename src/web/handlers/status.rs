// Status handler — GET /api/status (admin).
//
// One JSON snapshot of the whole system: active model metadata, store and
// feedback row counts, and the live retrain status.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use crate::web::{api_error, AppState};

/// GET /api/status — model, dataset, and retrain state in one response.
pub async fn get_status(State(state): State<AppState>) -> Response {
    let model_info = match state.model.current().await {
        Some(model) => serde_json::json!({
            "loaded": true,
            "trained_at": model.trained_at.to_rfc3339(),
            "held_out_accuracy": model.held_out_accuracy,
            "dataset_rows": model.dataset_rows,
        }),
        None => serde_json::json!({ "loaded": false }),
    };

    let dataset_rows = match state.store.row_count().await {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "Failed to count dataset rows");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read dataset");
        }
    };
    let feedback_rows = match state.feedback.row_count().await {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "Failed to count feedback rows");
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read feedback log",
            );
        }
    };

    let retrain = state.retrain_status.read().await.clone();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "model": model_info,
            "dataset_rows": dataset_rows,
            "feedback_rows": feedback_rows,
            "retrain": retrain,
        })),
    )
        .into_response()
}
