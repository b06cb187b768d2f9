//! # Local Filesystem Store
//!
//! Artifacts live at `{root}/packages/{first}/{package}/{filename}`.
//! Directories are created on first write. Package directories are only
//! discovered under single-character bucket directories, matching the
//! `packages/?/*` layout.
//!
//! Writes are staged in a hidden temporary file beside the target and then
//! linked into place without clobbering, so readers only ever see complete
//! artifacts and a crash mid-write leaves nothing at the final path.

use std::collections::BTreeSet;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use pypicache_core::path::{ArtifactPath, PACKAGES_DIR};
use pypicache_core::{ArtifactRecord, PackageCacheError, PackageName, Result};

use crate::{md5_hex, not_found, ArtifactStore};

/// Name prefix of in-flight writes. Such files are never listed.
const STAGING_PREFIX: &str = ".pypicache-partial-";

/// An [`ArtifactStore`] rooted at a local directory.
#[derive(Debug, Clone)]
pub struct DiskArtifactStore {
    root: PathBuf,
}

impl DiskArtifactStore {
    /// Create a store rooted at `root`. The directory need not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute filesystem path of an artifact.
    pub fn file_path(&self, path: &ArtifactPath) -> PathBuf {
        let mut full = self.root.clone();
        for segment in path.segments() {
            full.push(segment);
        }
        full
    }

    fn package_dir(&self, package: &PackageName) -> PathBuf {
        self.root
            .join(PACKAGES_DIR)
            .join(package.first_letter().to_string())
            .join(package.as_str())
    }

    /// URL under which this proxy serves the artifact.
    fn file_url(package: &PackageName, filename: &str) -> String {
        format!("/packages/{package}/{filename}")
    }
}

/// Write `content` to a staging file in `dir`, sync it, then publish it at
/// `target`. Fails with `AlreadyExists` if `target` is present.
fn publish(dir: &Path, target: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(dir)?;
    staged.write_all(content)?;
    staged.flush()?;
    staged.as_file().sync_all()?;
    // On failure the staging file is dropped and removed.
    staged.persist_noclobber(target).map_err(|e| e.error)?;
    Ok(())
}

/// Names of the subdirectories of `dir`. A missing `dir` yields nothing.
async fn subdirectories(dir: &Path) -> Result<Vec<String>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

#[async_trait]
impl ArtifactStore for DiskArtifactStore {
    async fn list_packages(&self) -> Result<Vec<PackageName>> {
        let packages_root = self.root.join(PACKAGES_DIR);
        tracing::debug!(path = %packages_root.display(), "listing packages");

        let mut packages = BTreeSet::new();
        for bucket in subdirectories(&packages_root).await? {
            if bucket.chars().count() != 1 {
                continue;
            }
            for name in subdirectories(&packages_root.join(&bucket)).await? {
                match PackageName::new(&name) {
                    Ok(package) => {
                        packages.insert(package);
                    }
                    Err(e) => tracing::warn!(name = %name, error = %e, "skipping invalid package directory"),
                }
            }
        }
        Ok(packages.into_iter().collect())
    }

    async fn list_files(&self, package: &PackageName) -> Result<Vec<ArtifactRecord>> {
        let dir = self.package_dir(package);
        tracing::debug!(package = %package, path = %dir.display(), "listing files");

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if filename.starts_with(STAGING_PREFIX) {
                continue;
            }
            let content = tokio::fs::read(entry.path()).await?;
            records.push(ArtifactRecord {
                package: package.clone(),
                firstletter: package.first_letter(),
                url: Self::file_url(package, &filename),
                md5: md5_hex(&content),
                filename,
            });
        }
        records.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(records)
    }

    async fn get(&self, package: &PackageName, filename: &str) -> Result<Bytes> {
        let path = ArtifactPath::new(package, filename)?;
        let file_path = self.file_path(&path);
        tracing::debug!(path = %file_path.display(), "reading artifact");

        match tokio::fs::read(&file_path).await {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found(package, filename)),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, package: &PackageName, filename: &str, content: Bytes) -> Result<()> {
        let path = ArtifactPath::new(package, filename)?;
        let file_path = self.file_path(&path);
        let dir = self.package_dir(package);
        tokio::fs::create_dir_all(&dir).await?;

        let size = content.len();
        let target = file_path.clone();
        let published = tokio::task::spawn_blocking(move || publish(&dir, &target, &content))
            .await
            .map_err(|e| PackageCacheError::Storage(format!("write task for {path} failed: {e}")))?;
        match published {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(PackageCacheError::NotOverwriting(path.key()));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(path = %file_path.display(), bytes = size, "stored artifact");
        Ok(())
    }
}
