//! Object-store error types.

use thiserror::Error;

/// Errors reported by an [`ObjectStore`](super::ObjectStore) backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No object exists at the given key.
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The readiness wait gave up before the object became visible.
    #[error("object {bucket}/{key} not visible after {attempts} attempts")]
    NotReady {
        bucket: String,
        key: String,
        attempts: u32,
    },

    /// Requested range starts past the end of the object.
    #[error("invalid range for {bucket}/{key} at offset {offset}")]
    InvalidRange {
        bucket: String,
        key: String,
        offset: u64,
    },

    /// The service rejected the request.
    #[error("service error: {code} - {message}")]
    Service { code: String, message: String },

    /// Transport or SDK failure.
    #[error("store error: {0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub(crate) fn not_found(bucket: &str, key: &str) -> Self {
        StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    /// Check whether this error means the key does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type alias for object-store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(StoreError::not_found("b", "k").is_not_found());
        let other = StoreError::Service {
            code: "AccessDenied".to_string(),
            message: "denied".to_string(),
        };
        assert!(!other.is_not_found());
    }

    #[test]
    fn test_display() {
        let err = StoreError::not_found("bucket", "a/b.txt");
        assert_eq!(err.to_string(), "object not found: bucket/a/b.txt");

        let err = StoreError::NotReady {
            bucket: "bucket".to_string(),
            key: "k".to_string(),
            attempts: 3,
        };
        assert_eq!(err.to_string(), "object bucket/k not visible after 3 attempts");
    }
}
