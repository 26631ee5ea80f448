//! Model loading and caching
//!
//! `ModelStore` resolves model files inside a single, explicitly configured
//! directory, deserializes each file once, and hands out `Arc`-shared
//! handles from a bounded LRU cache keyed by filename. A handle, once
//! loaded, is never implicitly reloaded; a missing model file is a
//! permanent startup failure.

use crate::cache::LruCache;
use crate::error::{Result, ScoringError};
use crate::model::Classifier;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Default serialized-model filename
pub const DEFAULT_MODEL_FILE: &str = "model.json";

/// Maximum number of distinct model handles kept resident
pub const MODEL_CACHE_CAPACITY: usize = 10;

/// Loads and caches classifier handles from a model directory
pub struct ModelStore {
    dir: PathBuf,
    cache: LruCache<String, Arc<Classifier>>,
}

impl std::fmt::Debug for ModelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelStore")
            .field("dir", &self.dir)
            .field("cached_models", &self.cache.len())
            .finish()
    }
}

impl ModelStore {
    /// Create a store over `dir` with the default cache capacity.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_capacity(dir, MODEL_CACHE_CAPACITY)
    }

    /// Create a store with an explicit cache capacity.
    pub fn with_capacity(dir: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            dir: dir.into(),
            cache: LruCache::new(capacity),
        }
    }

    /// The directory this store resolves filenames in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load a model by filename, reusing the cached handle when present.
    ///
    /// Repeated calls with the same filename return the identical `Arc`.
    /// The population closure runs under the cache lock, so concurrent
    /// first calls for one filename perform a single directory scan and
    /// file read.
    pub fn load(&self, filename: &str) -> Result<Arc<Classifier>> {
        self.cache
            .get_or_try_insert_with(filename.to_string(), || self.read_model(filename))
    }

    /// Load the default model file.
    pub fn load_default(&self) -> Result<Arc<Classifier>> {
        self.load(DEFAULT_MODEL_FILE)
    }

    /// Serialize a classifier into the store directory.
    pub fn save(&self, filename: &str, model: &Classifier) -> Result<()> {
        let json = serde_json::to_string_pretty(model)?;
        fs::write(self.dir.join(filename), json)?;
        Ok(())
    }

    /// Drop a cached handle. The next `load` re-reads the file.
    pub fn evict(&self, filename: &str) -> bool {
        self.cache.remove(&filename.to_string()).is_some()
    }

    /// Cache statistics: (hits, misses, hit_rate).
    pub fn cache_stats(&self) -> (u64, u64, f64) {
        self.cache.stats()
    }

    fn read_model(&self, filename: &str) -> Result<Arc<Classifier>> {
        if !self.dir_contains(filename)? {
            return Err(ScoringError::ModelNotFound {
                filename: filename.to_string(),
                search_dir: self.dir.display().to_string(),
            });
        }

        let raw = fs::read_to_string(self.dir.join(filename))?;
        let model: Classifier =
            serde_json::from_str(&raw).map_err(|source| ScoringError::ModelDeserialization {
                filename: filename.to_string(),
                source,
            })?;

        info!("Loaded model '{}' from {}", filename, self.dir.display());
        Ok(Arc::new(model))
    }

    /// Listing-based presence check, so an absent file and an unreadable
    /// directory fail differently.
    fn dir_contains(&self, filename: &str) -> Result<bool> {
        for entry in fs::read_dir(&self.dir)? {
            if entry?.file_name() == filename {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LogisticModel, MajorityModel};
    use tempfile::TempDir;

    fn stub_model(label: f64) -> Classifier {
        Classifier::Majority(MajorityModel {
            label,
            n_features: 2,
        })
    }

    fn store_with_model() -> (TempDir, ModelStore) {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());
        store.save(DEFAULT_MODEL_FILE, &stub_model(1.0)).unwrap();
        (dir, store)
    }

    #[test]
    fn test_load_default() {
        let (_dir, store) = store_with_model();
        let model = store.load_default().unwrap();
        assert_eq!(model.n_features(), 2);
    }

    #[test]
    fn test_repeated_load_is_identity_stable() {
        let (_dir, store) = store_with_model();

        let first = store.load(DEFAULT_MODEL_FILE).unwrap();
        let second = store.load(DEFAULT_MODEL_FILE).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let (hits, misses, _) = store.cache_stats();
        assert_eq!(hits, 1);
        assert_eq!(misses, 1);
    }

    #[test]
    fn test_missing_file_names_file_and_directory() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());

        let err = store.load("model.json").unwrap_err();
        assert!(matches!(err, ScoringError::ModelNotFound { .. }));
        let msg = err.to_string();
        assert!(msg.contains("model.json"));
        assert!(msg.contains(&dir.path().display().to_string()));
    }

    #[test]
    fn test_corrupt_file_is_deserialization_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("model.json"), "{ not a model").unwrap();

        let store = ModelStore::new(dir.path());
        let err = store.load("model.json").unwrap_err();
        assert!(matches!(err, ScoringError::ModelDeserialization { .. }));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());

        let model = Classifier::Logistic(LogisticModel {
            coefficients: vec![0.5, -0.25],
            intercept: 0.1,
            threshold: 0.5,
        });
        store.save("clf.json", &model).unwrap();

        let loaded = store.load("clf.json").unwrap();
        assert_eq!(loaded.n_features(), 2);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path());

        assert!(store.load(DEFAULT_MODEL_FILE).is_err());

        // Writing the file afterwards must make the next load succeed
        store.save(DEFAULT_MODEL_FILE, &stub_model(0.0)).unwrap();
        assert!(store.load(DEFAULT_MODEL_FILE).is_ok());
    }

    #[test]
    fn test_eviction_beyond_capacity() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::with_capacity(dir.path(), 2);

        for name in ["a.json", "b.json", "c.json"] {
            store.save(name, &stub_model(1.0)).unwrap();
            store.load(name).unwrap();
        }

        let a_before = store.load("a.json").unwrap();
        // "a" was evicted by "c", so this load re-read the file
        let a_again = store.load("a.json").unwrap();
        assert!(Arc::ptr_eq(&a_before, &a_again));
    }

    #[test]
    fn test_evict_forces_reload() {
        let (_dir, store) = store_with_model();

        let first = store.load(DEFAULT_MODEL_FILE).unwrap();
        assert!(store.evict(DEFAULT_MODEL_FILE));
        let second = store.load(DEFAULT_MODEL_FILE).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
