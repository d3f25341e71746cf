// Retrain trigger — POST /api/retrain (admin).
//
// Flips the shared status to running and spawns the background job. A second
// trigger while one is in flight gets 409; the job itself clears the running
// flag when it finishes either way.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use tracing::info;

use crate::web::{api_error, retrain_job, AppState};

/// POST /api/retrain — kick off a background retrain. Returns 202 with the
/// initial status; poll GET /api/status for progress.
pub async fn trigger_retrain(State(state): State<AppState>) -> Response {
    {
        let mut status = state.retrain_status.write().await;
        if status.running {
            return api_error(StatusCode::CONFLICT, "A retrain is already running");
        }
        status.running = true;
        status.started_at = Some(Utc::now().to_rfc3339());
        status.progress_message = "Starting retrain…".to_string();
        status.last_error = None;
    }

    info!("Retrain triggered");
    retrain_job::launch_retrain(
        state.config.clone(),
        state.store.clone(),
        state.model.clone(),
        state.retrain_status.clone(),
    );

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "message": "Retrain started" })),
    )
        .into_response()
}
