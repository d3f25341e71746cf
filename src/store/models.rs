// Row types shared by the stores and the training pipeline.

use serde::{Deserialize, Serialize};

use crate::features::{self, FEATURE_COUNT};

/// One training example: a feature vector in canonical order plus its
/// ground-truth class (1 = phishing, 0 = legitimate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub features: [f64; FEATURE_COUNT],
    pub label: u8,
}

impl LabeledRecord {
    /// Featurize a URL through the shared extractor. This is the only way
    /// URLs become training rows — ingestion and serving cannot diverge.
    pub fn from_url(url: &str, label: u8) -> Self {
        Self {
            features: features::extract(url),
            label,
        }
    }
}

/// One user-asserted feedback row, held outside the canonical dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub url: String,
    pub label: u8,
}
