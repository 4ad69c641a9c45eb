use moka::sync::Cache;
use serde_json::Value;
use std::hash::Hash;
use std::time::Duration;

/// The TTL callers conventionally pass. Entries never expire regardless.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// In-memory store that keeps every entry for as long as the manager lives.
///
/// There is no capacity bound and no expiry; the `ttl` taken by [`set`]
/// is accepted and ignored.
///
/// [`set`]: CacheManager::set
pub struct CacheManager<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    cache: Cache<K, V>,
}

impl<K, V> CacheManager<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().build(),
        }
    }

    pub fn set(&self, key: K, value: V, _ttl: Duration) {
        self.cache.insert(key, value);
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.cache.get(key)
    }

    pub fn get_or(&self, key: &K, default: V) -> V {
        self.cache.get(key).unwrap_or(default)
    }

    /// Returns the cached value, computing and storing it first if the key
    /// is absent. `compute` runs at most once per key.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        self.cache.get_with(key, compute)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.cache.contains_key(key)
    }

    pub fn remove(&self, key: &K) {
        self.cache.invalidate(key);
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl<K, V> Default for CacheManager<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

// Helper type for JSON caching
pub type JsonCache = CacheManager<String, Value>;
