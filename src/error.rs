//! Error types for the disk cache
//!
//! Provides unified error handling using thiserror.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the disk cache engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is missing its id or segment, or they are not strings
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Segment name rejected by validation
    #[error("{0}")]
    InvalidSegmentName(String),

    /// TTL above the maximum representable value
    #[error("Invalid ttl (greater than {}): {0}", crate::cache::MAX_TTL_MS)]
    InvalidTtl(i64),

    /// Value could not be encoded into an envelope
    #[error("Serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Stored bytes could not be decoded into an envelope
    #[error("Corrupt envelope: {0}")]
    CorruptEnvelope(#[source] serde_json::Error),

    /// Operation attempted while the engine is stopped
    #[error("Connection not started")]
    NotStarted,

    /// Cache root is missing or not a directory
    #[error("Invalid cache path \"{}\": {1}", .0.display())]
    InvalidCachePath(PathBuf, String),

    /// Any other filesystem failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Configuration could not be loaded
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    /// Wraps an I/O error with a message naming the failed operation.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        CacheError::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns true if this is a filesystem "not found" failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    /// Returns the underlying I/O error kind, if any.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            CacheError::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the disk cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_keeps_context_and_kind() {
        let err = CacheError::io(
            "Error reading from \"/tmp/x.json\"",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );

        assert_eq!(err.to_string(), "Error reading from \"/tmp/x.json\": denied");
        assert_eq!(err.io_kind(), Some(io::ErrorKind::PermissionDenied));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_detection() {
        let err = CacheError::io("Error unlinking", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert!(!CacheError::NotStarted.is_not_found());
    }

    #[test]
    fn test_invalid_ttl_message() {
        let err = CacheError::InvalidTtl(2_147_483_648);
        assert_eq!(
            err.to_string(),
            "Invalid ttl (greater than 2147483647): 2147483648"
        );
    }
}
