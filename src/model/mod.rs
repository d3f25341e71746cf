// Classifier interface and the serving-side verdict type.
//
// The rest of the system treats the model as an opaque collaborator:
// predict / predict_proba / fit / save / load. `UrlClassifier` is that seam;
// `LogisticModel` is the one implementation shipped.

pub mod active;
pub mod classifier;
pub mod training;

pub use active::ActiveModel;
pub use classifier::LogisticModel;
pub use training::{fit, TrainOptions, TrainReport};

use serde::Serialize;

use crate::features::{self, FEATURE_COUNT};

/// Prediction interface. Implementations must be deterministic for a given
/// loaded instance — the same vector always yields the same answer.
pub trait UrlClassifier: Send + Sync {
    /// Binary label: 1 = phishing, 0 = legitimate.
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> u8;

    /// Probability distribution over [legitimate, phishing]; sums to 1.
    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> [f64; 2];
}

/// One classified URL, as returned to both the CLI and the web handlers.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    /// 1 = phishing, 0 = legitimate.
    pub label: u8,
    pub phishing: bool,
    /// Probability of the predicted class.
    pub confidence: f64,
    /// [p_legitimate, p_phishing]
    pub probabilities: [f64; 2],
}

impl Verdict {
    /// The human-readable classification sentence shown to form users.
    pub fn sentence(&self) -> String {
        let kind = if self.phishing {
            "Phishing"
        } else {
            "Legitimate"
        };
        format!(
            "This is a {kind} URL ({:.2}% confidence)",
            self.confidence * 100.0
        )
    }
}

/// Classify a raw URL. This is the single serving path: it runs the shared
/// extractor and then predict + predict_proba on the same vector, so every
/// caller (CLI check, JSON route, form route) agrees bit-for-bit.
pub fn classify(model: &dyn UrlClassifier, url: &str) -> Verdict {
    let vector = features::extract(url);
    let label = model.predict(&vector);
    let probabilities = model.predict_proba(&vector);

    Verdict {
        label,
        phishing: label == 1,
        confidence: probabilities[label as usize],
        probabilities,
    }
}
