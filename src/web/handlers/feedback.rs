// Feedback handler — POST /api/feedback.
//
// Public drop box for user-asserted labels. Rows land in the feedback log,
// not the training store; an admin merges them explicitly via
// POST /api/dataset/merge.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use crate::web::{api_error, AppState};

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub url: String,
    pub label: u8,
}

/// POST /api/feedback — record a user-asserted label for a URL.
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(body): Json<FeedbackRequest>,
) -> Response {
    if body.url.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "URL must not be empty");
    }
    if body.label > 1 {
        return api_error(StatusCode::BAD_REQUEST, "Label must be 0 or 1");
    }

    if let Err(e) = state.feedback.append(&body.url, body.label).await {
        warn!(error = %e, "Failed to append feedback");
        return api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to record feedback",
        );
    }

    info!(url = %body.url, label = body.label, "Feedback recorded");
    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Feedback recorded" })),
    )
        .into_response()
}
