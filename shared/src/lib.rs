// shared/src/lib.rs

use std::time::Duration;

/// Boxed error produced by an underlying cache-protocol client.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Raised only by local argument validation, before any backend call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Whatever the underlying client reported, kept as the error source.
    #[error("backend failure: {0}")]
    Backend(#[source] BackendError),
    #[error("config: {0}")]
    Config(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn backend<E>(err: E) -> Self
    where
        E: Into<BackendError>,
    {
        Error::Backend(err.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    pub fn is_backend(&self) -> bool {
        matches!(self, Error::Backend(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Expiration in whole seconds. `Ttl(0)` never expires; Memcached reads values
/// above 30 days as an absolute Unix timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ttl(pub u32);

impl Ttl {
    pub const NEVER: Ttl = Ttl(0);

    pub fn secs(self) -> u32 {
        self.0
    }

    /// `None` for `Ttl(0)`, matching the "never expires" reading.
    pub fn as_duration(self) -> Option<Duration> {
        match self.0 {
            0 => None,
            secs => Some(Duration::from_secs(u64::from(secs))),
        }
    }
}

pub mod config;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::backend(io);

        assert!(err.is_backend());
        assert!(!err.is_invalid_argument());

        let source = std::error::Error::source(&err).unwrap();
        let io = source.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = Error::invalid_argument("key must be a string");
        assert!(err.is_invalid_argument());
        assert_eq!(err.to_string(), "invalid argument: key must be a string");
    }

    #[test]
    fn test_ttl_zero_never_expires() {
        assert_eq!(Ttl::NEVER.as_duration(), None);
        assert_eq!(Ttl(5).as_duration(), Some(Duration::from_secs(5)));
        assert_eq!(Ttl(90).secs(), 90);
    }
}
