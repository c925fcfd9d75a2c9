use serde_json::Value;
use shared::{Result, Ttl};
use std::collections::HashMap;

/// Generic cache contract consumed by application code
/// (cache-aside lookups, session storage, ...)
///
/// Every operation has three outcomes: `Ok` with the result, `Err` with
/// `Error::InvalidArgument` when a key or value is not a string (nothing is
/// sent to the backend), or `Err` with `Error::Backend` carrying the
/// underlying client's failure.
pub trait SimpleCache: Send + Sync {
    /// Stored value, or `default` on a miss.
    fn get(&self, key: &Value, default: Value) -> Result<Value>;

    /// `ttl` of `None` defers to the backend's default expiration.
    fn set(&self, key: &Value, value: &Value, ttl: Option<Ttl>) -> Result<bool>;

    fn delete(&self, key: &Value) -> Result<bool>;

    /// Flushes the whole cache, including keys written by other clients.
    fn clear(&self) -> Result<bool>;

    /// Has an entry for every requested key; misses hold `default`.
    fn get_multiple(&self, keys: &[Value], default: Value) -> Result<HashMap<String, Value>>;

    fn set_multiple(&self, entries: &[(Value, Value)], ttl: Option<Ttl>) -> Result<bool>;

    fn delete_multiple(&self, keys: &[Value]) -> Result<bool>;

    fn has(&self, key: &Value) -> Result<bool>;
}
