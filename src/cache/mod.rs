//! Bounded caching
//!
//! A thread-safe LRU cache used by the model store to keep deserialized
//! handles resident, with hit/miss statistics.

mod lru;

pub use lru::LruCache;
