//! Error types for the bucketfs library.

use thiserror::Error;

use crate::store::StoreError;

/// Main error type for filesystem operations.
///
/// Every path-related variant carries the failing operation and the path
/// involved, and renders as `"<op> <path>: <reason>"`.
#[derive(Error, Debug)]
pub enum FsError {
    /// The operation has no sound mapping onto the object store.
    #[error("{op} {path}: operation not supported by the object store")]
    NotSupported { op: &'static str, path: String },

    /// Neither a point lookup nor a prefix listing found the path.
    #[error("{op} {path}: no such file or directory")]
    NotFound { op: &'static str, path: String },

    /// Object-store failure, annotated with the operation and path.
    #[error("{op} {path}: {source}")]
    Path {
        op: &'static str,
        path: String,
        #[source]
        source: StoreError,
    },

    /// A stream is already open on this handle.
    #[error("{op} {path}: already opened")]
    AlreadyOpened { op: &'static str, path: String },

    /// Seek target is not reachable.
    #[error("{op} {path}: invalid seek offset {offset}")]
    InvalidSeek {
        op: &'static str,
        path: String,
        offset: i64,
    },

    /// The handle has no stream for this kind of access.
    #[error("{op} {path}: handle not opened for this access")]
    NotOpened { op: &'static str, path: String },

    /// The handle was already closed.
    #[error("{op} {path}: file already closed")]
    Closed { op: &'static str, path: String },

    /// Directory enumeration on a plain file.
    #[error("{op} {path}: not a directory")]
    NotDirectory { op: &'static str, path: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FsError {
    pub(crate) fn store(op: &'static str, path: impl Into<String>, source: StoreError) -> Self {
        FsError::Path {
            op,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn not_supported(op: &'static str, path: impl Into<String>) -> Self {
        FsError::NotSupported {
            op,
            path: path.into(),
        }
    }

    pub(crate) fn not_found(op: &'static str, path: impl Into<String>) -> Self {
        FsError::NotFound {
            op,
            path: path.into(),
        }
    }

    /// Re-attribute a path error to the calling operation.
    pub(crate) fn with_op(mut self, new_op: &'static str) -> Self {
        match &mut self {
            FsError::NotSupported { op, .. }
            | FsError::NotFound { op, .. }
            | FsError::Path { op, .. }
            | FsError::AlreadyOpened { op, .. }
            | FsError::InvalidSeek { op, .. }
            | FsError::NotOpened { op, .. }
            | FsError::Closed { op, .. }
            | FsError::NotDirectory { op, .. } => *op = new_op,
            FsError::Config(_) | FsError::Json(_) => {}
        }
        self
    }

    /// Check whether the error means the path does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            FsError::NotFound { .. } => true,
            FsError::Path { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Check whether the operation is unsupported by the store.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, FsError::NotSupported { .. })
    }

    /// Name of the failing operation, if the error concerns a path.
    pub fn op(&self) -> Option<&'static str> {
        match self {
            FsError::NotSupported { op, .. }
            | FsError::NotFound { op, .. }
            | FsError::Path { op, .. }
            | FsError::AlreadyOpened { op, .. }
            | FsError::InvalidSeek { op, .. }
            | FsError::NotOpened { op, .. }
            | FsError::Closed { op, .. }
            | FsError::NotDirectory { op, .. } => Some(op),
            FsError::Config(_) | FsError::Json(_) => None,
        }
    }

    /// Path involved in the failure, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            FsError::NotSupported { path, .. }
            | FsError::NotFound { path, .. }
            | FsError::Path { path, .. }
            | FsError::AlreadyOpened { path, .. }
            | FsError::InvalidSeek { path, .. }
            | FsError::NotOpened { path, .. }
            | FsError::Closed { path, .. }
            | FsError::NotDirectory { path, .. } => Some(path),
            FsError::Config(_) | FsError::Json(_) => None,
        }
    }
}

/// Result type alias for bucketfs operations.
pub type Result<T> = std::result::Result<T, FsError>;
