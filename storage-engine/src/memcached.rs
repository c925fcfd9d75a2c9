use cache_facade::{BackendFactory, CacheBackend, CacheClient};
use shared::config::MEMCACHED_PORT;
use shared::{Error, Result, Ttl};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

pub type MemcachedClient = CacheClient<MemcachedBackend>;

/// Longest key the Memcached text protocol accepts, in bytes
pub const MAX_KEY_LEN: usize = 250;

/// Key the text protocol cannot frame. Reported as `Error::Backend`, the way
/// the server's own client libraries fail bad keys.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum KeyError {
    #[error("memcached key is empty")]
    Empty,
    #[error("memcached key is {0} bytes, limit is {max}", max = MAX_KEY_LEN)]
    TooLong(usize),
    #[error("memcached key {0:?} contains whitespace or control characters")]
    Unframeable(String),
}

fn check_key(key: &str) -> Result<()> {
    let err = if key.is_empty() {
        KeyError::Empty
    } else if key.len() > MAX_KEY_LEN {
        KeyError::TooLong(key.len())
    } else if key
        .bytes()
        .any(|b| b.is_ascii_whitespace() || b.is_ascii_control())
    {
        KeyError::Unframeable(key.to_string())
    } else {
        return Ok(());
    };
    Err(Error::backend(err))
}

/// Slot for a handle created on first use
///
/// The lock only guards reading or storing the handle; dialing runs without
/// it, so a slow or failing connect never queues other callers. When two
/// callers race, the first stored handle wins and the other is dropped.
struct LazyClient<C> {
    slot: Mutex<Option<C>>,
}

impl<C> LazyClient<C>
where
    C: Clone,
{
    fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<C>>> {
        self.slot
            .lock()
            .map_err(|_| Error::backend("memcached client slot poisoned"))
    }

    fn is_set(&self) -> bool {
        self.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    fn get_or_connect<F>(&self, dial: F) -> Result<C>
    where
        F: FnOnce() -> Result<C>,
    {
        if let Some(client) = self.lock()?.as_ref() {
            return Ok(client.clone());
        }

        let fresh = dial()?;
        Ok(self.lock()?.get_or_insert(fresh).clone())
    }
}

/// Backend over the `memcache` crate client, bound to a single server
///
/// The client is created on first use, so an unreachable server surfaces as
/// `Error::Backend` from the first operation rather than from construction.
/// A failed attempt leaves the slot empty and the next call dials again.
pub struct MemcachedBackend {
    url: String,
    client: LazyClient<memcache::Client>,
}

impl MemcachedBackend {
    pub fn new(host: &str) -> Self {
        Self {
            url: Self::url_for(host),
            client: LazyClient::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_set()
    }

    fn url_for(host: &str) -> String {
        // bare IPv6 literals need brackets before the port is appended
        if host.contains(':') && !host.starts_with('[') {
            format!("memcache://[{host}]:{MEMCACHED_PORT}")
        } else {
            format!("memcache://{host}:{MEMCACHED_PORT}")
        }
    }

    fn client(&self) -> Result<memcache::Client> {
        self.client.get_or_connect(|| {
            debug!(url = %self.url, "connecting to memcached");
            memcache::connect(self.url.as_str()).map_err(Error::backend)
        })
    }

    fn expiration(ttl: Option<Ttl>) -> u32 {
        // 0 leaves expiry to the server, which never expires the entry
        ttl.map(Ttl::secs).unwrap_or(0)
    }
}

impl BackendFactory for MemcachedBackend {
    fn for_host(host: &str) -> Self {
        Self::new(host)
    }
}

impl CacheBackend for MemcachedBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        check_key(key)?;
        self.client()?.get::<String>(key).map_err(Error::backend)
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Ttl>) -> Result<bool> {
        check_key(key)?;
        self.client()?
            .set(key, value, Self::expiration(ttl))
            .map_err(Error::backend)?;
        Ok(true)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        check_key(key)?;
        self.client()?.delete(key).map_err(Error::backend)
    }

    fn flush(&self) -> Result<bool> {
        self.client()?.flush().map_err(Error::backend)?;
        Ok(true)
    }

    fn get_multi(&self, keys: &[&str]) -> Result<HashMap<String, String>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        keys.iter().try_for_each(|key| check_key(key))?;
        self.client()?.gets::<String>(keys).map_err(Error::backend)
    }

    fn set_multi(&self, entries: &[(&str, &str)], ttl: Option<Ttl>) -> Result<bool> {
        entries.iter().try_for_each(|(key, _)| check_key(key))?;
        let client = self.client()?;
        let expiration = Self::expiration(ttl);

        for (key, value) in entries {
            client.set(key, *value, expiration).map_err(Error::backend)?;
        }
        Ok(true)
    }

    fn delete_multi(&self, keys: &[&str]) -> Result<bool> {
        keys.iter().try_for_each(|key| check_key(key))?;
        let client = self.client()?;

        let mut all_deleted = true;
        for key in keys {
            all_deleted &= client.delete(key).map_err(Error::backend)?;
        }
        Ok(all_deleted)
    }
}

impl Debug for MemcachedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemcachedBackend")
            .field("url", &self.url)
            .field("connected", &self.is_connected())
            .finish()
    }
}
