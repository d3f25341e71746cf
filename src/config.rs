use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::model::training::DEFAULT_SEED;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file is
/// loaded automatically at startup via dotenvy.
pub struct Config {
    /// Canonical training dataset (LURECHECK_DATASET_PATH).
    pub dataset_path: PathBuf,
    /// Quarantined user-feedback log (LURECHECK_FEEDBACK_PATH).
    pub feedback_path: PathBuf,
    /// Persisted model file (LURECHECK_MODEL_PATH).
    pub model_path: PathBuf,
    /// Seed for the train/test shuffle (LURECHECK_TRAIN_SEED, default 42).
    pub train_seed: u64,
    /// Password for the admin endpoints (LURECHECK_WEB_PASSWORD).
    pub web_password: String,
    /// Secret for HMAC session token signing (LURECHECK_SESSION_SECRET).
    pub session_secret: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Paths all have ./data defaults so `init` works out of the box; the
    /// web credentials are only required when serving.
    pub fn load() -> Result<Self> {
        let train_seed = match env::var("LURECHECK_TRAIN_SEED") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("LURECHECK_TRAIN_SEED must be an integer, got {raw:?}"))?,
            Err(_) => DEFAULT_SEED,
        };

        Ok(Self {
            dataset_path: env::var("LURECHECK_DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/training.csv")),
            feedback_path: env::var("LURECHECK_FEEDBACK_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/feedback.csv")),
            model_path: env::var("LURECHECK_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/model.json")),
            train_seed,
            web_password: env::var("LURECHECK_WEB_PASSWORD").unwrap_or_default(),
            session_secret: env::var("LURECHECK_SESSION_SECRET").unwrap_or_default(),
        })
    }

    /// Check that the admin credentials are configured.
    /// Call this before starting the web server.
    pub fn require_web_auth(&self) -> Result<()> {
        if self.web_password.is_empty() || self.session_secret.is_empty() {
            anyhow::bail!(
                "LURECHECK_WEB_PASSWORD and LURECHECK_SESSION_SECRET must be set to serve.\n\
                 Add them to your .env file (see .env.example)."
            );
        }
        Ok(())
    }
}
