use crate::domain;
use crate::operation::SimpleCache;
use crate::ports::{BackendFactory, CacheBackend};
use serde_json::Value;
use shared::config::Config;
use shared::{Result, Ttl};
use std::collections::HashMap;
use std::fmt::Debug;
use tracing::{debug, warn};

/// Adapter from the generic cache contract onto one cache-protocol backend
///
/// Validates arguments, forwards the call unchanged, and fills in defaults on
/// a miss. Adds no locking, retries or local caching of its own.
pub struct CacheClient<B>
where
    B: CacheBackend,
{
    backend: B,
}

impl<B> CacheClient<B>
where
    B: CacheBackend,
{
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B> CacheClient<B>
where
    B: BackendFactory,
{
    /// Binds to `host` on the standard Memcached port. Nothing is dialed
    /// until the first operation.
    pub fn new(host: &str) -> Self {
        debug!(host, "creating cache client");
        Self::with_backend(B::for_host(host))
    }
}

impl<B> Default for CacheClient<B>
where
    B: BackendFactory,
{
    fn default() -> Self {
        Self::new(Config::DEFAULT_HOST)
    }
}

fn rejected<T>(op: &'static str, res: Result<T>) -> Result<T> {
    res.inspect_err(|e| warn!(op, "rejected before reaching backend: {e}"))
}

impl<B> SimpleCache for CacheClient<B>
where
    B: CacheBackend,
{
    fn get(&self, key: &Value, default: Value) -> Result<Value> {
        let key = rejected("get", domain::key(key))?;

        match self.backend.get(key)? {
            Some(value) => {
                debug!(key, "cache hit");
                Ok(Value::String(value))
            }
            None => {
                debug!(key, "cache miss");
                Ok(default)
            }
        }
    }

    fn set(&self, key: &Value, value: &Value, ttl: Option<Ttl>) -> Result<bool> {
        let (key, value) = rejected("set", domain::key_value(key, value))?;

        let stored = self.backend.set(key, value, ttl)?;
        debug!(key, ttl = ttl.map(Ttl::secs), stored, "set");
        Ok(stored)
    }

    fn delete(&self, key: &Value) -> Result<bool> {
        let key = rejected("delete", domain::key(key))?;

        let deleted = self.backend.delete(key)?;
        debug!(key, deleted, "delete");
        Ok(deleted)
    }

    fn clear(&self) -> Result<bool> {
        let flushed = self.backend.flush()?;
        debug!(flushed, "flushed entire cache");
        Ok(flushed)
    }

    fn get_multiple(&self, keys: &[Value], default: Value) -> Result<HashMap<String, Value>> {
        let keys = rejected("get_multiple", domain::keys(keys))?;

        let mut found = self.backend.get_multi(&keys)?;
        debug!(requested = keys.len(), hits = found.len(), "get_multiple");

        let mut result = HashMap::with_capacity(keys.len());
        for key in keys {
            result.entry(key.to_string()).or_insert_with(|| {
                found
                    .remove(key)
                    .map(Value::String)
                    .unwrap_or_else(|| default.clone())
            });
        }
        Ok(result)
    }

    fn set_multiple(&self, entries: &[(Value, Value)], ttl: Option<Ttl>) -> Result<bool> {
        let entries = rejected("set_multiple", domain::entries(entries))?;

        let stored = self.backend.set_multi(&entries, ttl)?;
        debug!(count = entries.len(), ttl = ttl.map(Ttl::secs), stored, "set_multiple");
        Ok(stored)
    }

    fn delete_multiple(&self, keys: &[Value]) -> Result<bool> {
        let keys = rejected("delete_multiple", domain::keys(keys))?;

        let deleted = self.backend.delete_multi(&keys)?;
        debug!(count = keys.len(), deleted, "delete_multiple");
        Ok(deleted)
    }

    fn has(&self, key: &Value) -> Result<bool> {
        let key = rejected("has", domain::key(key))?;

        self.backend.exists(key)
    }
}

impl<B> Debug for CacheClient<B>
where
    B: CacheBackend,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheClient")
            .field("backend", &std::any::type_name::<B>())
            .finish()
    }
}
