//! Inference adapter module
//!
//! The request path the hosting scoring server drives:
//! load → pre-process → predict → post-process.
//!
//! The server owns HTTP/RPC handling and routing; this module only exposes
//! the pipeline functions and their configuration.

mod config;
mod engine;

pub use config::InferenceConfig;
pub use engine::{InferenceEngine, InferenceStats, Prediction};
