// Web server — Axum-based serving and admin backend.
//
// Public surface: prediction (JSON and form flavors) and the feedback drop
// box. Everything that mutates the canonical dataset or the active model
// sits behind the HMAC session auth middleware.
//
// All routes serve JSON; there is no UI here.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::model::ActiveModel;
use crate::store::{DatasetStore, FeedbackLog};

pub mod auth;
pub mod handlers;
pub mod retrain_job;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DatasetStore>,
    pub feedback: Arc<FeedbackLog>,
    pub model: Arc<ActiveModel>,
    pub retrain_status: Arc<RwLock<retrain_job::RetrainStatus>>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(
    config: Config,
    store: Arc<dyn DatasetStore>,
    feedback: Arc<FeedbackLog>,
    model: Arc<ActiveModel>,
    port: u16,
    bind: &str,
) -> Result<()> {
    let state = AppState {
        config: Arc::new(config),
        store,
        feedback,
        model,
        retrain_status: Arc::new(RwLock::new(retrain_job::RetrainStatus::default())),
    };

    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Lurecheck listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    // Admin routes (require valid session cookie)
    let protected_api = Router::new()
        .route("/api/status", get(handlers::status::get_status))
        .route("/api/retrain", post(handlers::retrain::trigger_retrain))
        .route("/api/dataset", post(handlers::dataset::add_example))
        .route("/api/dataset/merge", post(handlers::dataset::merge_feedback))
        .route("/api/logout", post(handlers::auth::logout))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    // Public routes (no auth)
    let public_api = Router::new()
        .route("/health", get(health))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/predict", post(handlers::predict::predict_json))
        .route("/predict", post(handlers::predict::predict_form))
        .route("/api/feedback", post(handlers::feedback::submit_feedback));

    Router::new()
        .merge(protected_api)
        .merge(public_api)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe — always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}

/// Marker type indicating the request passed session authentication.
/// Inserted into request extensions by `require_auth` middleware.
#[derive(Clone)]
pub struct AuthUser;
