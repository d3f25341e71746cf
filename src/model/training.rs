// Training pipeline: seeded split, SGD fit, held-out accuracy.
//
// All randomness (the train/test shuffle and the per-epoch example order)
// comes from one StdRng seeded by the caller, so the same dataset and seed
// reproduce the same weights and the same reported accuracy. Different
// seeds may legitimately differ — cross-run determinism is only promised
// per seed.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::features::FEATURE_COUNT;
use crate::store::models::LabeledRecord;

use super::classifier::{sigmoid, LogisticModel, ScalingParams};

/// Default seed for the train/test shuffle.
pub const DEFAULT_SEED: u64 = 42;

/// Fewer rows than this and a held-out split stops being meaningful.
const MIN_DATASET_ROWS: usize = 10;

#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub seed: u64,
    /// Fraction of rows held out for accuracy measurement.
    pub test_fraction: f64,
    pub epochs: usize,
    pub learning_rate: f64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            test_fraction: 0.2,
            epochs: 300,
            learning_rate: 0.1,
        }
    }
}

/// What a fit run reports back to the operator.
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub accuracy: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub seed: u64,
    pub trained_at: DateTime<Utc>,
}

/// Fit a logistic regression on the labeled dataset.
///
/// Returns the trained model together with its report. Errors (too little
/// data, a single-class dataset) are ordinary `Err`s — callers keep whatever
/// model they already had.
pub fn fit(records: &[LabeledRecord], opts: &TrainOptions) -> Result<(LogisticModel, TrainReport)> {
    if records.len() < MIN_DATASET_ROWS {
        anyhow::bail!(
            "dataset has {} rows, need at least {MIN_DATASET_ROWS} to train",
            records.len()
        );
    }
    let phishing = records.iter().filter(|r| r.label == 1).count();
    if phishing == 0 || phishing == records.len() {
        anyhow::bail!("dataset contains only one class, cannot fit a classifier");
    }

    let mut rng = StdRng::seed_from_u64(opts.seed);

    // Shuffled index split.
    let mut indices: Vec<usize> = (0..records.len()).collect();
    indices.shuffle(&mut rng);

    let mut test_len = (records.len() as f64 * opts.test_fraction).round() as usize;
    test_len = test_len.clamp(1, records.len() - 1);
    let (test_idx, train_idx) = indices.split_at(test_len);

    let train_rows: Vec<[f64; FEATURE_COUNT]> =
        train_idx.iter().map(|&i| records[i].features).collect();
    let scaling = ScalingParams::fit(&train_rows);

    let scaled_train: Vec<([f64; FEATURE_COUNT], f64)> = train_idx
        .iter()
        .map(|&i| (scaling.apply(&records[i].features), records[i].label as f64))
        .collect();

    // Online gradient descent, example order reshuffled every epoch.
    let mut weights = vec![0.0f64; FEATURE_COUNT + 1];
    let mut order: Vec<usize> = (0..scaled_train.len()).collect();
    for _ in 0..opts.epochs {
        order.shuffle(&mut rng);
        for &i in &order {
            let (x, y) = &scaled_train[i];
            let bias = weights[FEATURE_COUNT];
            let logit: f64 =
                weights[..FEATURE_COUNT].iter().zip(x.iter()).map(|(w, v)| w * v).sum::<f64>()
                    + bias;
            let error = y - sigmoid(logit);
            for (w, v) in weights[..FEATURE_COUNT].iter_mut().zip(x.iter()) {
                *w += opts.learning_rate * error * v;
            }
            weights[FEATURE_COUNT] += opts.learning_rate * error;
        }
    }

    let trained_at = Utc::now();
    let mut model = LogisticModel {
        weights,
        scaling,
        feature_count: FEATURE_COUNT,
        trained_at,
        held_out_accuracy: 0.0,
        dataset_rows: records.len(),
    };

    // Held-out accuracy at the 0.5 threshold.
    let correct = test_idx
        .iter()
        .filter(|&&i| {
            let p = model.phishing_probability(&records[i].features);
            let predicted = if p >= 0.5 { 1 } else { 0 };
            predicted == records[i].label
        })
        .count();
    let accuracy = correct as f64 / test_len as f64;
    model.held_out_accuracy = accuracy;

    let report = TrainReport {
        accuracy,
        train_rows: train_idx.len(),
        test_rows: test_len,
        seed: opts.seed,
        trained_at,
    };

    Ok((model, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UrlClassifier;

    /// Separable toy data: phishing rows have many dots, legitimate few.
    fn toy_dataset(n: usize) -> Vec<LabeledRecord> {
        (0..n)
            .map(|i| {
                let phishing = i % 2 == 1;
                let mut features = [0.0; FEATURE_COUNT];
                features[0] = if phishing { 9.0 + (i % 3) as f64 } else { 1.0 + (i % 3) as f64 };
                features[3] = if phishing { 120.0 } else { 30.0 };
                LabeledRecord {
                    features,
                    label: phishing as u8,
                }
            })
            .collect()
    }

    #[test]
    fn test_fit_separable_data_scores_high() {
        let records = toy_dataset(60);
        let (model, report) = fit(&records, &TrainOptions::default()).unwrap();

        assert!(report.accuracy >= 0.9, "accuracy was {}", report.accuracy);
        assert_eq!(report.train_rows + report.test_rows, 60);

        let mut phishy = [0.0; FEATURE_COUNT];
        phishy[0] = 10.0;
        phishy[3] = 120.0;
        assert_eq!(model.predict(&phishy), 1);

        let mut benign = [0.0; FEATURE_COUNT];
        benign[0] = 1.0;
        benign[3] = 30.0;
        assert_eq!(model.predict(&benign), 0);
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let records = toy_dataset(40);
        let opts = TrainOptions::default();
        let (a, report_a) = fit(&records, &opts).unwrap();
        let (b, report_b) = fit(&records, &opts).unwrap();

        assert_eq!(a.weights, b.weights);
        assert_eq!(report_a.accuracy, report_b.accuracy);
    }

    #[test]
    fn test_rejects_tiny_dataset() {
        let records = toy_dataset(4);
        assert!(fit(&records, &TrainOptions::default()).is_err());
    }

    #[test]
    fn test_rejects_single_class() {
        let mut records = toy_dataset(20);
        for r in &mut records {
            r.label = 0;
        }
        assert!(fit(&records, &TrainOptions::default()).is_err());
    }

    #[test]
    fn test_model_carries_report_metadata() {
        let records = toy_dataset(30);
        let (model, report) = fit(&records, &TrainOptions::default()).unwrap();
        assert_eq!(model.held_out_accuracy, report.accuracy);
        assert_eq!(model.dataset_rows, 30);
    }
}
