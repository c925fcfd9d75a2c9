use cache_facade::CacheBackend;
use moka::Expiry;
use moka::sync::Cache;
use shared::config::Config;
use shared::{Result, Ttl};
use std::collections::HashMap;
use std::fmt::Debug;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    // resolved at write time; None never expires
    ttl: Option<Duration>,
}

/// Per-entry expiry: every write carries its own resolved TTL
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        entry.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        entry.ttl
    }
}

/// Moka-based in-process backend with per-entry TTL support
/// Stands in for a Memcached server in local runs and tests
pub struct MokaCache {
    cache: Cache<String, Entry>,
    default_ttl: Option<Duration>,
}

impl MokaCache {
    const NAME: &str = "moka-backend";

    /// Create a new unbounded Moka cache with optional default TTL
    pub fn new_unbounded(default_ttl: Option<Duration>) -> Self {
        Self::new(Self::NAME, None, default_ttl)
    }

    /// Create a new bounded Moka cache with max entries and optional default TTL
    pub fn new_bounded(max_entries: u64, default_ttl: Option<Duration>) -> Self {
        Self::new(Self::NAME, Some(max_entries), default_ttl)
    }

    pub fn new(name: &str, max_entries: Option<u64>, default_ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder().name(name).expire_after(EntryExpiry);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
            default_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Self::NAME,
            config.max_entries,
            config.default_ttl.and_then(Ttl::as_duration),
        )
    }

    // Ttl(0) never expires, no TTL falls back to the cache default
    fn resolve_ttl(&self, ttl: Option<Ttl>) -> Option<Duration> {
        match ttl {
            Some(ttl) => ttl.as_duration(),
            None => self.default_ttl,
        }
    }

    fn insert(&self, key: &str, value: &str, ttl: Option<Duration>) {
        self.cache.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                ttl,
            },
        );
    }
}

impl CacheBackend for MokaCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cache.get(key).map(|entry| entry.value))
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Ttl>) -> Result<bool> {
        self.insert(key, value, self.resolve_ttl(ttl));
        Ok(true)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.cache.remove(key).is_some())
    }

    fn flush(&self) -> Result<bool> {
        self.cache.invalidate_all();
        Ok(true)
    }

    fn get_multi(&self, keys: &[&str]) -> Result<HashMap<String, String>> {
        Ok(keys
            .iter()
            .filter_map(|key| {
                self.cache
                    .get(*key)
                    .map(|entry| (key.to_string(), entry.value))
            })
            .collect())
    }

    fn set_multi(&self, entries: &[(&str, &str)], ttl: Option<Ttl>) -> Result<bool> {
        let ttl = self.resolve_ttl(ttl);
        for (key, value) in entries {
            self.insert(key, value, ttl);
        }
        Ok(true)
    }

    fn delete_multi(&self, keys: &[&str]) -> Result<bool> {
        let mut all_deleted = true;
        for key in keys {
            all_deleted &= self.cache.remove(*key).is_some();
        }
        Ok(all_deleted)
    }
}

impl Debug for MokaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCache")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
