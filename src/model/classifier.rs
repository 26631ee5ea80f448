//! Trained classifier variants
//!
//! The serialized format is plain serde JSON; the store owns reading and
//! writing it. Each variant predicts one label per input row.

use crate::error::{Result, ScoringError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Logistic regression classifier with fitted coefficients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Fitted coefficients, one per feature
    pub coefficients: Vec<f64>,
    /// Fitted intercept
    pub intercept: f64,
    /// Decision threshold on the positive-class probability
    pub threshold: f64,
}

impl LogisticModel {
    fn decision(&self, x: &Array2<f64>) -> Array1<f64> {
        Array1::from_iter(x.rows().into_iter().map(|row| {
            let z: f64 = row
                .iter()
                .zip(&self.coefficients)
                .map(|(xi, wi)| xi * wi)
                .sum::<f64>()
                + self.intercept;
            let p = 1.0 / (1.0 + (-z).exp());
            if p >= self.threshold {
                1.0
            } else {
                0.0
            }
        }))
    }
}

/// Majority-class baseline: always predicts the stored label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MajorityModel {
    /// Label emitted for every row
    pub label: f64,
    /// Number of features the model was trained on
    pub n_features: usize,
}

/// Enum of trained model variants the store can deserialize
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Classifier {
    Logistic(LogisticModel),
    Majority(MajorityModel),
}

impl Classifier {
    /// Number of features expected per input row
    pub fn n_features(&self) -> usize {
        match self {
            Classifier::Logistic(m) => m.coefficients.len(),
            Classifier::Majority(m) => m.n_features,
        }
    }

    /// Predict one label per input row.
    ///
    /// The model is deterministic: output depends only on the fitted
    /// parameters and `x`.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.n_features() {
            return Err(ScoringError::ShapeMismatch {
                expected: format!("{} features", self.n_features()),
                actual: format!("{} features", x.ncols()),
            });
        }

        match self {
            Classifier::Logistic(m) => Ok(m.decision(x)),
            Classifier::Majority(m) => Ok(Array1::from_elem(x.nrows(), m.label)),
        }
    }
}
