//! # Error Hierarchy
//!
//! Structured error types shared by the store, the upstream index client,
//! and the cache coordinator, built with `thiserror`.
//!
//! The three domain variants carry distinct recovery semantics:
//!
//! - [`PackageCacheError::NotFound`] — the artifact is absent. From a store
//!   this triggers an upstream fetch; from the upstream index it is final.
//! - [`PackageCacheError::Remote`] — the upstream index answered with an
//!   unexpected failure, or could not be reached.
//! - [`PackageCacheError::NotOverwriting`] — a write-once violation.

use thiserror::Error;

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, PackageCacheError>;

/// Top-level error type for pypicache operations.
#[derive(Error, Debug)]
pub enum PackageCacheError {
    /// Package or file not present, locally and/or upstream.
    #[error("not found: {0}")]
    NotFound(String),

    /// Upstream index returned an unexpected response or was unreachable.
    #[error("remote error from {endpoint}: {message}")]
    Remote {
        /// The upstream URL or call that failed.
        endpoint: String,
        /// What went wrong.
        message: String,
    },

    /// An artifact already exists at the target path.
    #[error("not overwriting existing artifact {0}")]
    NotOverwriting(String),

    /// A package name, filename, or requirement failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage backend failure other than not-found or already-exists.
    #[error("storage error: {0}")]
    Storage(String),

    /// Local filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PackageCacheError {
    /// Whether this error means "the artifact does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this error is a write-once violation.
    pub fn is_not_overwriting(&self) -> bool {
        matches!(self, Self::NotOverwriting(_))
    }
}

/// Validation errors for package names and filenames.
///
/// Names flow straight into filesystem paths and object keys, so anything
/// that could escape the `packages/{first}/{package}/` prefix is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Package name is empty or whitespace.
    #[error("package name must be non-empty")]
    EmptyPackageName,

    /// Package name contains a path separator, control character, or is a dot segment.
    #[error("invalid package name: {0:?}")]
    InvalidPackageName(String),

    /// Filename is empty.
    #[error("filename must be non-empty")]
    EmptyFilename,

    /// Filename contains a path separator, control character, or is a dot segment.
    #[error("invalid filename: {0:?}")]
    InvalidFilename(String),

    /// No package name could be parsed out of an uploaded filename.
    #[error("cannot determine package name from filename {0:?} (expected <package>-<version>.<ext>)")]
    UnparseableFilename(String),
}
