#![deny(clippy::all)]

use shared::{Result, Ttl};
use std::collections::HashMap;
use std::sync::Arc;

// Ports are the pluggable extension points for the underlying cache-protocol client

/// Port for building a backend bound to one server host
pub trait BackendFactory: CacheBackend + Sized {
    fn for_host(host: &str) -> Self;
}

/// Port for the underlying cache-protocol client (e.g., Memcached)
///
/// A miss is `None` (or an omitted entry for `get_multi`), never an empty
/// value. Transport and protocol failures come back as `Error::Backend`.
pub trait CacheBackend: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str, ttl: Option<Ttl>) -> Result<bool>;
    /// `Ok(false)` when nothing was stored under `key`.
    fn delete(&self, key: &str) -> Result<bool>;
    fn flush(&self) -> Result<bool>;
    /// Keys with no stored value are left out of the returned map.
    fn get_multi(&self, keys: &[&str]) -> Result<HashMap<String, String>>;
    fn set_multi(&self, entries: &[(&str, &str)], ttl: Option<Ttl>) -> Result<bool>;
    /// `Ok(true)` only if every key was deleted.
    fn delete_multi(&self, keys: &[&str]) -> Result<bool>;

    /// Presence check. Override when the client has a native primitive.
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<B> CacheBackend for Arc<B>
where
    B: CacheBackend + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Ttl>) -> Result<bool> {
        (**self).set(key, value, ttl)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn flush(&self) -> Result<bool> {
        (**self).flush()
    }

    fn get_multi(&self, keys: &[&str]) -> Result<HashMap<String, String>> {
        (**self).get_multi(keys)
    }

    fn set_multi(&self, entries: &[(&str, &str)], ttl: Option<Ttl>) -> Result<bool> {
        (**self).set_multi(entries, ttl)
    }

    fn delete_multi(&self, keys: &[&str]) -> Result<bool> {
        (**self).delete_multi(keys)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }
}
