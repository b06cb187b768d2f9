//! # pypicache-store — Artifact Stores
//!
//! Durable storage of package files indexed by `(package, filename)` and laid
//! out as `packages/{first}/{package}/{filename}`.
//!
//! Two interchangeable backends implement [`ArtifactStore`]:
//!
//! | Backend                        | Layout root          | Record URL                      |
//! |--------------------------------|----------------------|---------------------------------|
//! | [`DiskArtifactStore`]          | a local directory    | `/packages/{package}/{filename}` |
//! | [`ObjectStoreArtifactStore`]   | an object-store bucket | pre-signed or public object URL |
//!
//! ## Write-Once Invariant
//!
//! [`ArtifactStore::put`] never replaces an existing artifact. The check and
//! the write are a single atomic operation (a no-clobber publish of a fully
//! written staging file on disk, a conditional create on object stores), so
//! two racing writers cannot both succeed: the loser gets
//! [`PackageCacheError::NotOverwriting`]. Readers never observe a partially
//! written artifact.

pub mod disk;
pub mod object;
mod pages;

pub use disk::DiskArtifactStore;
pub use object::{AmazonConfig, IndexReport, ObjectStoreArtifactStore};

use async_trait::async_trait;
use bytes::Bytes;
use pypicache_core::{ArtifactRecord, PackageCacheError, PackageName, Result};

/// Storage contract shared by every backend.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Every stored package name, sorted and deduplicated.
    async fn list_packages(&self) -> Result<Vec<PackageName>>;

    /// Records for every file stored under `package`, sorted by filename.
    ///
    /// Returns an empty list when the package has never been stored.
    async fn list_files(&self, package: &PackageName) -> Result<Vec<ArtifactRecord>>;

    /// Read an artifact. Fails with `NotFound` when absent.
    async fn get(&self, package: &PackageName, filename: &str) -> Result<Bytes>;

    /// Write an artifact. Fails with `NotOverwriting` when one already exists.
    async fn put(&self, package: &PackageName, filename: &str, content: Bytes) -> Result<()>;
}

/// Lowercase hex MD5 of `data`.
pub fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

pub(crate) fn not_found(package: &PackageName, filename: &str) -> PackageCacheError {
    PackageCacheError::NotFound(format!("package {package}: {filename} not found"))
}
