// Dataset admin handlers — POST /api/dataset and POST /api/dataset/merge.
//
// Both mutate the canonical training store, so both sit behind the session
// auth middleware. URLs are featurized at write time; the store only ever
// holds complete labeled feature rows.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

use crate::store::LabeledRecord;
use crate::web::{api_error, AppState};

#[derive(Deserialize)]
pub struct AddExampleRequest {
    pub url: String,
    pub label: u8,
}

/// POST /api/dataset — featurize a URL and append it to the training store.
pub async fn add_example(
    State(state): State<AppState>,
    Json(body): Json<AddExampleRequest>,
) -> Response {
    if body.url.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "URL must not be empty");
    }
    if body.label > 1 {
        return api_error(StatusCode::BAD_REQUEST, "Label must be 0 or 1");
    }

    let record = LabeledRecord::from_url(&body.url, body.label);
    if let Err(e) = state.store.append(&record).await {
        warn!(error = %e, "Failed to append training example");
        return api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to append training example",
        );
    }

    info!(url = %body.url, label = body.label, "Training example added");
    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Example added" })),
    )
        .into_response()
}

/// POST /api/dataset/merge — move the feedback log into the training store.
///
/// Rows leave the feedback log only after they are in the training store:
/// read everything, append row by row, then trim exactly the rows that
/// landed. A mid-merge append failure keeps every unmerged row in the log.
/// The new rows take effect on the next retrain, not immediately.
pub async fn merge_feedback(State(state): State<AppState>) -> Response {
    let entries = match state.feedback.read_all().await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Failed to read feedback log");
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read feedback log",
            );
        }
    };

    let mut merged = 0usize;
    let mut failure = None;
    for entry in &entries {
        let record = LabeledRecord::from_url(&entry.url, entry.label);
        if let Err(e) = state.store.append(&record).await {
            warn!(error = %e, merged, "Merge aborted mid-way");
            failure = Some(e);
            break;
        }
        merged += 1;
    }

    // Trim only the rows that made it into the store; everything after
    // stays in the log for a retry.
    if let Err(e) = state.feedback.remove_first(merged).await {
        warn!(error = %e, merged, "Failed to trim merged rows from the feedback log");
        return api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Merged rows could not be removed from the feedback log",
        );
    }

    if failure.is_some() {
        return api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed while appending merged feedback",
        );
    }

    info!(merged, "Feedback merged into training store");
    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Feedback merged", "merged": merged })),
    )
        .into_response()
}
