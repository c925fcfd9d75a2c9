use crate::{Error, Ttl};
use std::str::FromStr;
use tracing::warn;

/// Standard Memcached port. Not configurable.
pub const MEMCACHED_PORT: u16 = 11211;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Memcached,
    Memory,
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memcached" => Ok(BackendKind::Memcached),
            "memory" | "moka" => Ok(BackendKind::Memory),
            other => Err(Error::Config(format!(
                "unknown cache backend '{other}', expected 'memcached' or 'memory'"
            ))),
        }
    }
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memcached => "memcached",
            BackendKind::Memory => "memory",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub backend: BackendKind,
    pub default_ttl: Option<Ttl>, // in-process backend only
    pub max_entries: Option<u64>, // in-process backend only
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HOST)
    }
}

impl Config {
    pub const DEFAULT_HOST: &str = "127.0.0.1";

    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            backend: BackendKind::Memcached,
            default_ttl: None,
            max_entries: None,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. `from_env` is this over
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("MEMCACHED_HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_HOST.to_string());

        let backend = match lookup("CACHE_BACKEND") {
            Some(raw) => raw.parse::<BackendKind>().unwrap_or_else(|e| {
                warn!("{e}; falling back to memcached");
                BackendKind::Memcached
            }),
            None => BackendKind::Memcached,
        };

        Self {
            host,
            backend,
            default_ttl: parse_number::<u32>(&lookup, "CACHE_DEFAULT_TTL_SECS").map(Ttl),
            max_entries: parse_number::<u64>(&lookup, "CACHE_MAX_ENTRIES"),
        }
    }

    pub fn port(&self) -> u16 {
        MEMCACHED_PORT
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, MEMCACHED_PORT)
    }
}

fn parse_number<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T>
where
    T: FromStr,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!("{name}={raw:?} is not a valid number, ignoring it");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup_from(&[]));

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.backend, BackendKind::Memcached);
        assert_eq!(config.default_ttl, None);
        assert_eq!(config.max_entries, None);
        assert_eq!(config.endpoint(), "127.0.0.1:11211");
    }

    #[test]
    fn test_reads_all_variables() {
        let config = Config::from_lookup(lookup_from(&[
            ("MEMCACHED_HOST", "cache.internal"),
            ("CACHE_BACKEND", "Memory"),
            ("CACHE_DEFAULT_TTL_SECS", "300"),
            ("CACHE_MAX_ENTRIES", "10000"),
        ]));

        assert_eq!(config.host, "cache.internal");
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.default_ttl, Some(Ttl(300)));
        assert_eq!(config.max_entries, Some(10_000));
        assert_eq!(config.port(), MEMCACHED_PORT);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("MEMCACHED_HOST", "   "),
            ("CACHE_BACKEND", "redis"),
            ("CACHE_DEFAULT_TTL_SECS", "-5"),
            ("CACHE_MAX_ENTRIES", "lots"),
        ]));

        assert_eq!(config.host, Config::DEFAULT_HOST);
        assert_eq!(config.backend, BackendKind::Memcached);
        assert_eq!(config.default_ttl, None);
        assert_eq!(config.max_entries, None);
    }

    #[test]
    fn test_unknown_backend_is_config_error() {
        let err = "redis".parse::<BackendKind>().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!("moka".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert_eq!(BackendKind::Memory.as_str(), "memory");
    }
}
