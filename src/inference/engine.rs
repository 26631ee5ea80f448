//! Inference adapter implementation
//!
//! Serves the fixed per-request pipeline over a model loaded once at
//! startup:
//! - Explicit `load()` populates the handle through the store's bounded
//!   cache; the handle is never replaced afterwards.
//! - `pre_inference` / `post_inference` are identity pass-through hooks.
//! - `predict_json` is the scoring-server contract; `predict_rows` is the
//!   typed path beneath it.

use crate::error::{Result, ScoringError};
use crate::model::{Classifier, ModelStore};
use crate::monitoring::PerformanceMetrics;
use super::InferenceConfig;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Prediction returned to the scoring server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// One scalar per input row
    pub prediction: Vec<f64>,
}

/// Inference statistics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceStats {
    pub total_requests: u64,
    pub total_predictions: u64,
    pub avg_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub error_count: u64,
}

/// The inference adapter
pub struct InferenceEngine {
    config: InferenceConfig,
    store: ModelStore,
    model: Option<Arc<Classifier>>,
    metrics: Arc<PerformanceMetrics>,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("is_loaded", &self.is_loaded())
            .finish()
    }
}

impl InferenceEngine {
    /// Create an engine serving models from `model_dir`.
    ///
    /// The model file is not read here; call [`load`](Self::load) during
    /// startup.
    pub fn new(config: InferenceConfig, model_dir: impl AsRef<Path>) -> Self {
        let store = ModelStore::with_capacity(model_dir.as_ref(), config.cache_capacity);
        Self {
            config,
            store,
            model: None,
            metrics: Arc::new(PerformanceMetrics::new(1000)),
        }
    }

    /// Attach an already-deserialized model handle.
    pub fn with_model(mut self, model: Arc<Classifier>) -> Self {
        self.model = Some(model);
        self
    }

    /// Load the configured model file.
    ///
    /// One-way transition: once loaded, the handle stays for the lifetime
    /// of the engine, and repeated calls are no-ops. A missing or corrupt
    /// model file is a permanent startup failure.
    pub fn load(&mut self) -> Result<()> {
        if self.model.is_some() {
            return Ok(());
        }
        self.model = Some(self.store.load(&self.config.model_filename)?);
        Ok(())
    }

    /// Check if the engine is ready for predictions
    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Get the current configuration
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Get the model reference (if loaded)
    pub fn model(&self) -> Option<&Classifier> {
        self.model.as_deref()
    }

    /// Get the underlying model store
    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Pre-processing hook. Identity; reserved for feature scaling/encoding.
    pub fn pre_inference(&self, data: Array2<f64>) -> Array2<f64> {
        debug!("Preprocessing features");
        data
    }

    /// Post-processing hook. Identity; reserved for thresholding or label
    /// mapping.
    pub fn post_inference(&self, yhat: Array1<f64>) -> Array1<f64> {
        debug!("Postprocessing output");
        yhat
    }

    /// Score a row-oriented JSON payload: `[{"f1": 1.0, "f2": 2.0}, ...]`.
    ///
    /// Columns are ordered alphabetically by field name; every row must
    /// carry the same numeric fields. This is the request contract the
    /// scoring server drives.
    pub fn predict_json(&self, payload: &str) -> Result<Prediction> {
        let start = Instant::now();
        let result = self.predict_json_inner(payload);
        self.record(start, &result);
        result
    }

    /// Score an already-structured feature matrix.
    pub fn predict_rows(&self, x: &Array2<f64>) -> Result<Prediction> {
        let start = Instant::now();
        let result = self
            .loaded_model()
            .and_then(|model| self.run_pipeline(&model, x.clone()));
        self.record(start, &result);
        result
    }

    /// Get inference statistics snapshot
    pub fn stats(&self) -> InferenceStats {
        InferenceStats {
            total_requests: self.metrics.total_requests(),
            total_predictions: self.metrics.total_items(),
            avg_latency_ms: self.metrics.avg_latency(),
            p95_latency_ms: self.metrics.p95_latency(),
            error_count: self.metrics.total_errors(),
        }
    }

    fn predict_json_inner(&self, payload: &str) -> Result<Prediction> {
        let model = self.loaded_model()?;
        let (x, columns) = parse_feature_rows(payload)?;
        if self.config.log_features {
            debug!(rows = x.nrows(), ?columns, "Feature matrix: {:?}", x);
        }
        self.run_pipeline(&model, x)
    }

    fn loaded_model(&self) -> Result<Arc<Classifier>> {
        self.model.clone().ok_or(ScoringError::ModelNotLoaded)
    }

    fn run_pipeline(&self, model: &Classifier, x: Array2<f64>) -> Result<Prediction> {
        let x = self.pre_inference(x);
        debug!("Invoking model");
        let yhat = model.predict(&x)?;
        let yhat = self.post_inference(yhat);
        Ok(Prediction {
            prediction: yhat.to_vec(),
        })
    }

    fn record(&self, start: Instant, result: &Result<Prediction>) {
        match result {
            Ok(p) => {
                let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
                self.metrics.record_latency(latency_ms);
                self.metrics.record_items(p.prediction.len() as u64);
            }
            Err(_) => self.metrics.record_error(),
        }
    }
}

/// Parse a row-oriented JSON table into a rectangular numeric matrix.
///
/// Returns the matrix and its column names. `serde_json` maps iterate in
/// sorted key order, so the column order is deterministic.
fn parse_feature_rows(payload: &str) -> Result<(Array2<f64>, Vec<String>)> {
    let rows: Vec<serde_json::Map<String, Value>> = serde_json::from_str(payload)
        .map_err(|e| ScoringError::InvalidPayload(e.to_string()))?;

    if rows.is_empty() {
        return Err(ScoringError::InvalidPayload(
            "payload contains no rows".to_string(),
        ));
    }

    let columns: Vec<String> = rows[0].keys().cloned().collect();
    let mut data = Vec::with_capacity(rows.len() * columns.len());
    for (i, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(ScoringError::InvalidPayload(format!(
                "row {} has {} fields, expected {}",
                i,
                row.len(),
                columns.len()
            )));
        }
        for name in &columns {
            let value = row.get(name).ok_or_else(|| {
                ScoringError::InvalidPayload(format!("row {} is missing field '{}'", i, name))
            })?;
            let num = value.as_f64().ok_or_else(|| {
                ScoringError::InvalidPayload(format!(
                    "field '{}' in row {} is not numeric",
                    name, i
                ))
            })?;
            data.push(num);
        }
    }

    let x = Array2::from_shape_vec((rows.len(), columns.len()), data)
        .map_err(|e| ScoringError::InvalidPayload(e.to_string()))?;
    Ok((x, columns))
}
