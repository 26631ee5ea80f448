//! Inference configuration

use crate::model::{DEFAULT_MODEL_FILE, MODEL_CACHE_CAPACITY};
use serde::{Deserialize, Serialize};

/// Configuration for the inference adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Serialized model filename, resolved inside the model directory
    pub model_filename: String,

    /// Log the parsed feature matrix at debug level
    pub log_features: bool,

    /// Maximum number of model handles kept resident
    pub cache_capacity: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model_filename: DEFAULT_MODEL_FILE.to_string(),
            log_features: false,
            cache_capacity: MODEL_CACHE_CAPACITY,
        }
    }
}

impl InferenceConfig {
    /// Create a new inference configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the model filename
    pub fn with_model_filename(mut self, filename: impl Into<String>) -> Self {
        self.model_filename = filename.into();
        self
    }

    /// Builder method to enable feature-matrix logging
    pub fn with_feature_logging(mut self) -> Self {
        self.log_features = true;
        self
    }

    /// Builder method to set the model cache capacity
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}
