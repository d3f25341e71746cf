// Background retrain job — runs when triggered via POST /api/retrain.
//
// The job reads the whole training store, fits a fresh model, persists it,
// and hot-swaps it into the serving path. On any failure (missing file,
// malformed rows, training error) the previously active model stays in
// service untouched — retraining can fail, serving cannot regress to
// "no model loaded".
//
// Only one retrain runs at a time; the trigger handler returns 409 if one
// is already active.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::config::Config;
use crate::model::{fit, ActiveModel, TrainOptions};
use crate::store::DatasetStore;

/// Live status of the background retrain, exposed via GET /api/status.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetrainStatus {
    /// True while a retrain is in progress.
    pub running: bool,
    /// ISO 8601 timestamp of when the current/last retrain started.
    pub started_at: Option<String>,
    /// Human-readable progress message updated as phases complete.
    pub progress_message: String,
    /// Error message from the last retrain, if it failed.
    pub last_error: Option<String>,
    /// Held-out accuracy from the last successful retrain.
    pub last_accuracy: Option<f64>,
}

/// Launch the retrain pipeline in a background tokio task.
/// Returns immediately. Callers poll `/api/status` to track progress.
pub fn launch_retrain(
    config: Arc<Config>,
    store: Arc<dyn DatasetStore>,
    model: Arc<ActiveModel>,
    status: Arc<RwLock<RetrainStatus>>,
) {
    tokio::spawn(async move {
        if let Err(e) = run_retrain(config, store, model, status.clone()).await {
            error!(error = %e, "Background retrain failed");
            let mut s = status.write().await;
            s.running = false;
            s.last_error = Some(e.to_string());
            s.progress_message = "Retrain failed — previous model still active".to_string();
        }
    });
}

async fn run_retrain(
    config: Arc<Config>,
    store: Arc<dyn DatasetStore>,
    model: Arc<ActiveModel>,
    status: Arc<RwLock<RetrainStatus>>,
) -> anyhow::Result<()> {
    {
        let mut s = status.write().await;
        s.progress_message = "Loading training data…".to_string();
    }

    // Any load failure (missing file, bad header, malformed row) bails here
    // with the active model untouched.
    let records = store.load_all().await?;

    {
        let mut s = status.write().await;
        s.progress_message = format!("Training on {} rows…", records.len());
    }

    let opts = TrainOptions {
        seed: config.train_seed,
        ..TrainOptions::default()
    };
    let (trained, report) = fit(&records, &opts)?;

    // Persist first, swap second: if the save fails we keep serving the old
    // model and the old file still matches what is in memory.
    trained.save(&config.model_path)?;
    model.swap(trained).await;

    info!(
        accuracy = report.accuracy,
        rows = records.len(),
        "Retrain completed, model hot-swapped"
    );

    let mut s = status.write().await;
    s.running = false;
    s.last_error = None;
    s.last_accuracy = Some(report.accuracy);
    s.progress_message = format!(
        "Completed: {:.2}% held-out accuracy on {} rows",
        report.accuracy * 100.0,
        records.len()
    );

    Ok(())
}
