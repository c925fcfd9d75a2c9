use cache_facade::{CacheBackend, CacheClient};
use shared::config::{BackendKind, Config};
use std::sync::Arc;
use tracing::debug;

pub mod memcached;
pub mod moka_cache;

pub use memcached::{KeyError, MemcachedBackend, MemcachedClient};
pub use moka_cache::MokaCache;

/// Build the backend selected by `config.backend`
pub fn backend_from_config(config: &Config) -> Arc<dyn CacheBackend> {
    debug!(backend = config.backend.as_str(), host = %config.host, "building cache backend");

    match config.backend {
        BackendKind::Memcached => Arc::new(MemcachedBackend::new(&config.host)),
        BackendKind::Memory => Arc::new(MokaCache::from_config(config)),
    }
}

pub fn client_from_config(config: &Config) -> CacheClient<Arc<dyn CacheBackend>> {
    CacheClient::with_backend(backend_from_config(config))
}
