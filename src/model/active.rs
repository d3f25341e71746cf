// ActiveModel — the swappable reference cell for the serving path.
//
// Predictions clone the Arc under a read lock and then run lock-free; a
// retrain installs a new Arc under the write lock. In-flight predictions
// keep the instance they grabbed, so they observe either the old model or
// the new one in full — never a half-trained mix.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::LogisticModel;

pub struct ActiveModel {
    current: RwLock<Option<Arc<LogisticModel>>>,
}

impl ActiveModel {
    /// No model loaded yet — predictions will be refused, not faked.
    pub fn empty() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    pub fn with(model: LogisticModel) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(model))),
        }
    }

    /// Grab the currently active instance, if any.
    pub async fn current(&self) -> Option<Arc<LogisticModel>> {
        self.current.read().await.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Atomically replace the active instance.
    pub async fn swap(&self, model: LogisticModel) {
        *self.current.write().await = Some(Arc::new(model));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;
    use crate::model::classifier::ScalingParams;
    use crate::model::UrlClassifier;
    use chrono::Utc;

    fn model_with_bias(bias: f64) -> LogisticModel {
        let mut weights = vec![0.0; FEATURE_COUNT + 1];
        weights[FEATURE_COUNT] = bias;
        LogisticModel {
            weights,
            scaling: ScalingParams {
                min_vals: vec![0.0; FEATURE_COUNT],
                max_vals: vec![1.0; FEATURE_COUNT],
            },
            feature_count: FEATURE_COUNT,
            trained_at: Utc::now(),
            held_out_accuracy: 1.0,
            dataset_rows: 0,
        }
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let active = ActiveModel::empty();
        assert!(!active.is_loaded().await);
        assert!(active.current().await.is_none());
    }

    #[tokio::test]
    async fn test_swap_installs_new_instance() {
        let active = ActiveModel::with(model_with_bias(-5.0));
        let zeros = [0.0; FEATURE_COUNT];

        let before = active.current().await.unwrap();
        assert_eq!(before.predict(&zeros), 0);

        active.swap(model_with_bias(5.0)).await;
        let after = active.current().await.unwrap();
        assert_eq!(after.predict(&zeros), 1);
    }

    #[tokio::test]
    async fn test_old_handle_survives_swap() {
        let active = ActiveModel::with(model_with_bias(-5.0));
        let zeros = [0.0; FEATURE_COUNT];

        // An "in-flight prediction" holding the old Arc across a swap.
        let held = active.current().await.unwrap();
        active.swap(model_with_bias(5.0)).await;

        assert_eq!(held.predict(&zeros), 0);
        assert_eq!(active.current().await.unwrap().predict(&zeros), 1);
    }
}
