use std::fmt::Debug;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{Error, Result};
use crate::model::FeatureVector;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// A prediction capability the pipeline receives at construction time.
///
/// Must be side-effect-free and deterministic for a given feature vector so
/// tests can substitute a stub. A loaded model is read-only, so one instance
/// can be shared across invocations without locking.
pub trait Predictor: Send + Sync + Debug {
    fn predict(&self, features: &FeatureVector) -> Result<f64>;
}

/// A fitted random-forest precipitation regressor, persisted to disk by the
/// trainer and loaded once at dashboard start.
#[derive(Serialize, Deserialize)]
pub struct RainfallModel {
    forest: Forest,
}

impl Debug for RainfallModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RainfallModel")
    }
}

impl RainfallModel {
    /// Fit a forest on feature rows ordered per `FEATURE_NAMES` and their
    /// observed precipitation targets.
    pub fn fit(
        rows: &[Vec<f64>],
        targets: &[f64],
        n_trees: usize,
        seed: u64,
    ) -> anyhow::Result<Self> {
        let x = DenseMatrix::from_2d_vec(&rows.to_vec());
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(n_trees)
            .with_seed(seed);
        let forest = RandomForestRegressor::fit(&x, &targets.to_vec(), params)
            .map_err(|e| anyhow::anyhow!("failed to fit random forest: {e}"))?;
        Ok(Self { forest })
    }

    /// Load a serialized model artifact from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read model file: {}", path.display()))?;
        bincode::deserialize(&bytes)
            .with_context(|| format!("Failed to deserialize model file: {}", path.display()))
    }

    /// Serialize the model to disk, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create model directory: {}", parent.display())
            })?;
        }
        let bytes = bincode::serialize(self).context("Failed to serialize model")?;
        fs::write(path, bytes)
            .with_context(|| format!("Failed to write model file: {}", path.display()))?;
        Ok(())
    }

    /// Predict precipitation for many rows at once; used by the trainer to
    /// score the held-out split.
    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> anyhow::Result<Vec<f64>> {
        let x = DenseMatrix::from_2d_vec(&rows.to_vec());
        self.forest
            .predict(&x)
            .map_err(|e| anyhow::anyhow!("batch prediction failed: {e}"))
    }
}

impl Predictor for RainfallModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let x = DenseMatrix::from_2d_vec(&vec![features.to_vec()]);
        let predicted = self
            .forest
            .predict(&x)
            .map_err(|e| Error::PredictionFailure(e.to_string()))?;
        let value = predicted
            .first()
            .copied()
            .ok_or_else(|| Error::PredictionFailure("predictor returned no values".to_string()))?;
        if !value.is_finite() {
            return Err(Error::PredictionFailure(format!(
                "predictor returned non-numeric value: {value}"
            )));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FEATURE_NAMES;

    /// Synthetic rows where the target tracks the `rain` column, so even a
    /// small forest learns an obvious signal.
    fn training_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for i in 0..40 {
            let rain = (i % 8) as f64;
            let mut row = vec![0.5; FEATURE_NAMES.len()];
            row[0] = 20.0 + (i % 5) as f64; // temperature_2m
            row[9] = rain; // rain
            rows.push(row);
            targets.push(rain * 1.5);
        }
        (rows, targets)
    }

    #[test]
    fn fit_predict_is_deterministic_for_fixed_seed() {
        let (rows, targets) = training_data();
        let a = RainfallModel::fit(&rows, &targets, 10, 80).unwrap();
        let b = RainfallModel::fit(&rows, &targets, 10, 80).unwrap();

        let features = FeatureVector::from_ordered([
            22.0, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 4.0, 0.5, 0.5, 0.5,
        ]);
        assert_eq!(a.predict(&features).unwrap(), b.predict(&features).unwrap());
    }

    #[test]
    fn save_load_round_trip_preserves_predictions() {
        let (rows, targets) = training_data();
        let model = RainfallModel::fit(&rows, &targets, 10, 80).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        model.save(&path).unwrap();
        let loaded = RainfallModel::load(&path).unwrap();

        let features = FeatureVector::from_ordered([
            21.0, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 6.0, 0.5, 0.5, 0.5,
        ]);
        assert_eq!(
            model.predict(&features).unwrap(),
            loaded.predict(&features).unwrap()
        );
    }

    #[test]
    fn load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = RainfallModel::load(&dir.path().join("absent.bin")).unwrap_err();
        assert!(err.to_string().contains("Failed to read model file"));
    }
}
