//! # pypicache-core — Foundational Types
//!
//! Shared vocabulary for every pypicache crate:
//!
//! - [`PackageName`] — validated package identifier and its first-letter bucket.
//! - [`ArtifactPath`] — the `packages/{first}/{package}/{filename}` layout
//!   shared by the local store and the upstream index.
//! - [`ArtifactRecord`] / [`UpstreamUrlInfo`] — stored and advertised files.
//! - [`RequirementLine`] / [`ProcessingReport`] — pinned requirement batches.
//! - [`PackageCacheError`] — the error taxonomy (`NotFound`, `Remote`,
//!   `NotOverwriting`) that store, index client, and coordinator all speak.
//!
//! This crate performs no I/O.

#![deny(missing_docs)]

pub mod error;
pub mod filename;
pub mod package;
pub mod path;
pub mod record;
pub mod requirements;

pub use error::{PackageCacheError, Result, ValidationError};
pub use filename::{content_type_for, package_from_filename};
pub use package::PackageName;
pub use path::ArtifactPath;
pub use record::{ArtifactRecord, PackageType, UpstreamUrlInfo};
pub use requirements::{ErroredRequirement, ProcessingReport, RequirementLine};
