//! LRU cache
//!
//! Thread-safe bounded cache with least-recently-used eviction. All state
//! sits under one `parking_lot::Mutex`, so a population closure passed to
//! [`LruCache::get_or_try_insert_with`] runs while the lock is held:
//! concurrent callers racing on the same key observe exactly one population.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;

struct Inner<K, V> {
    map: HashMap<K, V>,
    /// Recency order, most recently used last.
    order: Vec<K>,
    hits: u64,
    misses: u64,
}

/// Bounded LRU cache
pub struct LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    capacity: usize,
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: Mutex::new(Inner {
                map: HashMap::with_capacity(capacity),
                order: Vec::with_capacity(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Get an entry, marking it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        match inner.map.get(key).cloned() {
            Some(value) => {
                Self::touch(&mut inner.order, key);
                inner.hits += 1;
                Some(value)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Insert an entry, evicting the least recently used one at capacity.
    pub fn insert(&self, key: K, value: V) {
        let mut guard = self.inner.lock();
        Self::insert_locked(&mut guard, self.capacity, key, value);
    }

    /// Return the cached value for `key`, populating it with `init` on miss.
    ///
    /// `init` runs under the cache lock; see module docs. A failed `init`
    /// leaves no entry behind.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        init: impl FnOnce() -> std::result::Result<V, E>,
    ) -> std::result::Result<V, E> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if let Some(value) = inner.map.get(&key).cloned() {
            Self::touch(&mut inner.order, &key);
            inner.hits += 1;
            return Ok(value);
        }
        inner.misses += 1;
        let value = init()?;
        Self::insert_locked(inner, self.capacity, key, value.clone());
        Ok(value)
    }

    /// Remove an entry, returning its value if present.
    pub fn remove(&self, key: &K) -> Option<V> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let removed = inner.map.remove(key);
        if removed.is_some() {
            inner.order.retain(|k| k != key);
        }
        removed
    }

    /// Check whether a key is cached without touching recency.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().map.contains_key(key)
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    /// Check whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries. Statistics are kept.
    pub fn clear(&self) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.map.clear();
        inner.order.clear();
    }

    /// Cache statistics: (hits, misses, hit_rate).
    pub fn stats(&self) -> (u64, u64, f64) {
        let inner = self.inner.lock();
        let total = inner.hits + inner.misses;
        let hit_rate = if total > 0 {
            inner.hits as f64 / total as f64
        } else {
            0.0
        };
        (inner.hits, inner.misses, hit_rate)
    }

    fn touch(order: &mut Vec<K>, key: &K) {
        if let Some(pos) = order.iter().position(|k| k == key) {
            let k = order.remove(pos);
            order.push(k);
        }
    }

    fn insert_locked(inner: &mut Inner<K, V>, capacity: usize, key: K, value: V) {
        if inner.map.insert(key.clone(), value).is_some() {
            Self::touch(&mut inner.order, &key);
            return;
        }
        if inner.order.len() >= capacity {
            let evicted = inner.order.remove(0);
            inner.map.remove(&evicted);
        }
        inner.order.push(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_get_insert() {
        let cache: LruCache<String, i32> = LruCache::new(3);

        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);

        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.get(&"b".to_string()), Some(2));
        assert_eq!(cache.get(&"c".to_string()), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_lru_eviction_respects_recency() {
        let cache: LruCache<String, i32> = LruCache::new(3);

        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("c".to_string(), 3);

        // Touch "a" so "b" becomes the eviction candidate
        cache.get(&"a".to_string());
        cache.insert("d".to_string(), 4);

        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.get(&"b".to_string()), None);
        assert_eq!(cache.get(&"c".to_string()), Some(3));
        assert_eq!(cache.get(&"d".to_string()), Some(4));
    }

    #[test]
    fn test_update_existing_key_does_not_evict() {
        let cache: LruCache<String, i32> = LruCache::new(2);

        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("a".to_string(), 10);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a".to_string()), Some(10));
        assert_eq!(cache.get(&"b".to_string()), Some(2));
    }

    #[test]
    fn test_get_or_try_insert_with_populates_once() {
        let cache: LruCache<String, i32> = LruCache::new(3);
        let mut calls = 0;

        let v = cache
            .get_or_try_insert_with("a".to_string(), || {
                calls += 1;
                Ok::<_, ()>(42)
            })
            .unwrap();
        assert_eq!(v, 42);

        let v = cache
            .get_or_try_insert_with("a".to_string(), || {
                calls += 1;
                Ok::<_, ()>(99)
            })
            .unwrap();
        assert_eq!(v, 42);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_get_or_try_insert_with_propagates_error() {
        let cache: LruCache<String, i32> = LruCache::new(3);

        let result = cache.get_or_try_insert_with("a".to_string(), || Err("boom"));
        assert_eq!(result, Err("boom"));
        // A failed population leaves nothing behind
        assert!(!cache.contains(&"a".to_string()));
    }

    #[test]
    fn test_stats() {
        let cache: LruCache<String, i32> = LruCache::new(3);

        cache.insert("a".to_string(), 1);
        cache.get(&"a".to_string());
        cache.get(&"a".to_string());
        cache.get(&"b".to_string());

        let (hits, misses, hit_rate) = cache.stats();
        assert_eq!(hits, 2);
        assert_eq!(misses, 1);
        assert!((hit_rate - 0.666).abs() < 0.01);
    }

    #[test]
    fn test_remove_and_clear() {
        let cache: LruCache<String, i32> = LruCache::new(3);

        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);

        assert_eq!(cache.remove(&"a".to_string()), Some(1));
        assert_eq!(cache.remove(&"a".to_string()), None);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        use std::sync::Arc;

        let cache: Arc<LruCache<u32, u32>> = Arc::new(LruCache::new(16));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..8 {
                        cache.insert(t * 8 + i, i);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 16);
    }
}
