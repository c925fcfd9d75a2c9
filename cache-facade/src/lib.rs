//! Generic cache contract over a Memcached-style backend.
//!
//! [`CacheClient`] validates caller arguments, forwards the call to a
//! [`CacheBackend`] and substitutes defaults on a miss. Backends live in the
//! `storage-engine` crate; tests inject in-memory ones through
//! [`CacheClient::with_backend`].

pub mod cache_client;
pub mod domain;
pub mod operation;
pub mod ports;

pub use cache_client::CacheClient;
pub use operation::SimpleCache;
pub use ports::{BackendFactory, CacheBackend};
