// Logistic regression over min/max-scaled features.
//
// Raw lexical features live on wildly different scales (UrlLength in the
// hundreds, flags in {0,1}), so the model carries the min/max ranges it was
// fitted with and rescales every incoming vector to [0,1] before the dot
// product. Training and inference share this struct, which is what keeps
// the preprocessing identical on both sides.
//
// Persistence is a JSON file via serde. The write goes through a temp file
// and an atomic rename so a crash mid-save never leaves a torn model that a
// later load would half-read.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::FEATURE_COUNT;

use super::UrlClassifier;

/// Per-column scaling ranges learned from the training split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingParams {
    pub min_vals: Vec<f64>,
    pub max_vals: Vec<f64>,
}

impl ScalingParams {
    /// Fit ranges from rows of raw feature vectors.
    pub fn fit(rows: &[[f64; FEATURE_COUNT]]) -> Self {
        let mut min_vals = vec![f64::INFINITY; FEATURE_COUNT];
        let mut max_vals = vec![f64::NEG_INFINITY; FEATURE_COUNT];
        for row in rows {
            for (i, &v) in row.iter().enumerate() {
                min_vals[i] = min_vals[i].min(v);
                max_vals[i] = max_vals[i].max(v);
            }
        }
        // Columns that never varied (or empty input) collapse to [0, 1].
        for i in 0..FEATURE_COUNT {
            if !min_vals[i].is_finite() || !max_vals[i].is_finite() {
                min_vals[i] = 0.0;
                max_vals[i] = 1.0;
            }
        }
        Self { min_vals, max_vals }
    }

    /// Rescale a raw vector to [0,1] per column, clamped so out-of-range
    /// values at inference time stay bounded.
    pub fn apply(&self, features: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut scaled = [0.0f64; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            let min = self.min_vals.get(i).copied().unwrap_or(0.0);
            let max = self.max_vals.get(i).copied().unwrap_or(1.0);
            let range = max - min;
            scaled[i] = if range > 0.0 {
                ((features[i] - min) / range).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
        scaled
    }
}

/// A trained logistic regression classifier plus its training metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    /// FEATURE_COUNT weights followed by the bias term.
    pub(crate) weights: Vec<f64>,
    pub(crate) scaling: ScalingParams,
    pub feature_count: usize,
    pub trained_at: DateTime<Utc>,
    /// Accuracy on the held-out split at fit time.
    pub held_out_accuracy: f64,
    /// Total labeled rows the model was fitted from (train + test).
    pub dataset_rows: usize,
}

impl LogisticModel {
    fn logit(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let scaled = self.scaling.apply(features);
        let bias = self.weights[self.weights.len() - 1];
        self.weights
            .iter()
            .zip(scaled.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + bias
    }

    /// Probability that the URL is phishing.
    pub fn phishing_probability(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        sigmoid(self.logit(features))
    }

    /// Serialize to JSON at `path`, atomically (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("renaming into {}", path.display()))?;
        Ok(())
    }

    /// Load a previously saved model. Rejects files fitted against a
    /// different feature count — those can only produce garbage predictions.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading model file {}", path.display()))?;
        let model: LogisticModel =
            serde_json::from_str(&json).context("parsing model file as JSON")?;

        if model.feature_count != FEATURE_COUNT || model.weights.len() != FEATURE_COUNT + 1 {
            anyhow::bail!(
                "model file {} was fitted with {} features, this build expects {}",
                path.display(),
                model.feature_count,
                FEATURE_COUNT
            );
        }
        Ok(model)
    }
}

impl UrlClassifier for LogisticModel {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> u8 {
        if self.phishing_probability(features) >= 0.5 {
            1
        } else {
            0
        }
    }

    fn predict_proba(&self, features: &[f64; FEATURE_COUNT]) -> [f64; 2] {
        let p = self.phishing_probability(features);
        [1.0 - p, p]
    }
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_model() -> LogisticModel {
        // Weight on feature 0 only: high NumDots → phishing.
        let mut weights = vec![0.0; FEATURE_COUNT + 1];
        weights[0] = 8.0;
        weights[FEATURE_COUNT] = -4.0; // bias
        LogisticModel {
            weights,
            scaling: ScalingParams {
                min_vals: vec![0.0; FEATURE_COUNT],
                max_vals: vec![10.0; FEATURE_COUNT],
            },
            feature_count: FEATURE_COUNT,
            trained_at: Utc::now(),
            held_out_accuracy: 1.0,
            dataset_rows: 0,
        }
    }

    #[test]
    fn test_proba_sums_to_one_and_matches_predict() {
        let model = toy_model();
        for dots in [0.0, 2.0, 5.0, 10.0] {
            let mut v = [0.0; FEATURE_COUNT];
            v[0] = dots;
            let proba = model.predict_proba(&v);
            assert!((proba[0] + proba[1] - 1.0).abs() < 1e-12);
            let expected = if proba[1] >= 0.5 { 1 } else { 0 };
            assert_eq!(model.predict(&v), expected);
        }
    }

    #[test]
    fn test_high_signal_flips_label() {
        let model = toy_model();
        let mut low = [0.0; FEATURE_COUNT];
        low[0] = 1.0;
        let mut high = [0.0; FEATURE_COUNT];
        high[0] = 10.0;
        assert_eq!(model.predict(&low), 0);
        assert_eq!(model.predict(&high), 1);
    }

    #[test]
    fn test_scaling_clamps_out_of_range() {
        let params = ScalingParams {
            min_vals: vec![0.0; FEATURE_COUNT],
            max_vals: vec![10.0; FEATURE_COUNT],
        };
        let mut v = [0.0; FEATURE_COUNT];
        v[0] = 1000.0;
        v[1] = -5.0;
        let scaled = params.apply(&v);
        assert_eq!(scaled[0], 1.0);
        assert_eq!(scaled[1], 0.0);
    }

    #[test]
    fn test_constant_column_scales_to_zero() {
        let rows = vec![[3.0; FEATURE_COUNT], [3.0; FEATURE_COUNT]];
        let params = ScalingParams::fit(&rows);
        let scaled = params.apply(&[3.0; FEATURE_COUNT]);
        assert!(scaled.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let model = toy_model();
        model.save(&path).unwrap();
        let loaded = LogisticModel::load(&path).unwrap();

        assert_eq!(loaded.weights, model.weights);
        let mut v = [0.0; FEATURE_COUNT];
        v[0] = 7.0;
        assert_eq!(loaded.predict_proba(&v), model.predict_proba(&v));
    }

    #[test]
    fn test_load_rejects_wrong_feature_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let mut model = toy_model();
        model.weights = vec![0.0; 6];
        model.feature_count = 5;
        let json = serde_json::to_string(&model).unwrap();
        std::fs::write(&path, json).unwrap();

        assert!(LogisticModel::load(&path).is_err());
    }
}
