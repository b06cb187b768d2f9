//! # Artifact Path Derivation
//!
//! Both the local store and the upstream index shard files by the package
//! name's first character:
//!
//! ```text
//! local store:   packages/{first}/{package}/{filename}
//! upstream sdist: packages/source/{first}/{package}/{filename}
//! upstream bdist: packages/{python_version}/{first}/{package}/{filename}
//! ```
//!
//! All derivation is pure string manipulation. Backends decide how the
//! relative key maps onto a directory root or an object-store bucket.

use std::fmt;

use crate::error::ValidationError;
use crate::package::{is_safe_segment, PackageName};

/// Top-level directory (or key prefix) holding every stored package.
pub const PACKAGES_DIR: &str = "packages";

/// Location of a single artifact within the store layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactPath {
    package: PackageName,
    filename: String,
}

impl ArtifactPath {
    /// Build the path for `filename` under `package`, validating the filename.
    pub fn new(package: &PackageName, filename: &str) -> Result<Self, ValidationError> {
        validate_filename(filename)?;
        Ok(Self {
            package: package.clone(),
            filename: filename.to_string(),
        })
    }

    /// Relative key: `packages/{first}/{package}/{filename}`.
    pub fn key(&self) -> String {
        format!("{}{}", package_prefix(&self.package), self.filename)
    }

    /// Path segments of [`key()`](Self::key), for joining onto a root directory.
    pub fn segments(&self) -> [String; 4] {
        [
            PACKAGES_DIR.to_string(),
            self.package.first_letter().to_string(),
            self.package.to_string(),
            self.filename.clone(),
        ]
    }

    /// Upstream URL path segments for this artifact, relative to the index
    /// root.
    ///
    /// With a python version the binary-distribution form is used, otherwise
    /// the source-distribution form. Segments are unencoded.
    pub fn upstream_segments(&self, python_version: Option<&str>) -> [String; 5] {
        [
            PACKAGES_DIR.to_string(),
            python_version.unwrap_or("source").to_string(),
            self.package.first_letter().to_string(),
            self.package.to_string(),
            self.filename.clone(),
        ]
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Key prefix holding every file of `package`: `packages/{first}/{package}/`.
pub fn package_prefix(package: &PackageName) -> String {
    format!("{PACKAGES_DIR}/{}/{}/", package.first_letter(), package)
}

/// Reject filenames that are empty or could escape the package directory.
pub fn validate_filename(filename: &str) -> Result<(), ValidationError> {
    if filename.is_empty() {
        return Err(ValidationError::EmptyFilename);
    }
    if !is_safe_segment(filename) {
        return Err(ValidationError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}
