//! # pypicache-cache — Cache Coordinator
//!
//! Composes an [`ArtifactStore`] with a [`PackageIndex`]:
//!
//! ```text
//! get_file: store.get ──hit──────────────────────────────▶ bytes
//!                 │
//!                miss
//!                 ▼
//!           index.fetch_file ─▶ store.put ─▶ store.get ──▶ bytes
//! ```
//!
//! The final re-read means a successful return always reflects what the
//! store holds. When two requests miss on the same artifact both fetch; the
//! slower one's `NotOverwriting` from `put` is benign and it re-reads the
//! winner's copy.
//!
//! [`PackageCache::cache_requirements`] drives the same fill for every sdist
//! of each `package==version` line of a requirements file.

use std::sync::Arc;

use bytes::Bytes;
use pypicache_core::{
    ArtifactRecord, ErroredRequirement, PackageName, ProcessingReport, RequirementLine, Result,
};
use pypicache_pypi::PackageIndex;
use pypicache_store::ArtifactStore;

/// Stateless coordinator over shared store and index handles.
#[derive(Clone)]
pub struct PackageCache {
    store: Arc<dyn ArtifactStore>,
    index: Arc<dyn PackageIndex>,
}

impl std::fmt::Debug for PackageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageCache").finish_non_exhaustive()
    }
}

impl PackageCache {
    pub fn new(store: Arc<dyn ArtifactStore>, index: Arc<dyn PackageIndex>) -> Self {
        Self { store, index }
    }

    /// Serve a file from the store, filling it from upstream on a miss.
    ///
    /// Upstream `NotFound` after a store miss is returned unchanged.
    pub async fn get_file(
        &self,
        package: &PackageName,
        filename: &str,
        python_version: Option<&str>,
    ) -> Result<Bytes> {
        match self.store.get(package, filename).await {
            Ok(content) => {
                tracing::debug!(package = %package, filename, "served from store");
                return Ok(content);
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        tracing::info!(package = %package, filename, ?python_version, "store miss, fetching upstream");
        let content = self
            .index
            .fetch_file(package, filename, python_version)
            .await?;

        match self.store.put(package, filename, content).await {
            Ok(()) => {}
            Err(e) if e.is_not_overwriting() => {
                tracing::warn!(package = %package, filename, "artifact stored by a concurrent request");
            }
            Err(e) => return Err(e),
        }

        self.store.get(package, filename).await
    }

    /// Cache the sdists of every exactly pinned line of `requirements`.
    ///
    /// Never fails as a whole: each line lands in exactly one report bucket,
    /// except that filenames cached before a line fails stay in `cached`.
    pub async fn cache_requirements(&self, requirements: &str) -> ProcessingReport {
        let mut report = ProcessingReport::new();
        for raw in requirements.lines() {
            let line = raw.trim();
            tracing::debug!(line, "examining requirement");

            let Some(requirement) = RequirementLine::parse(line) else {
                tracing::debug!(line, "not an exact pin");
                report.unparseable.push(line.to_string());
                continue;
            };

            match self.cache_pinned(&requirement, &mut report.cached).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    tracing::info!(line, error = %e, "requirement not found upstream");
                    report.failed.push(requirement.line);
                }
                Err(e) => {
                    tracing::warn!(line, error = %e, "requirement aborted");
                    report.errored.push(ErroredRequirement {
                        line: requirement.line,
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }

    async fn cache_pinned(&self, requirement: &RequirementLine, cached: &mut Vec<String>) -> Result<()> {
        let urls = self
            .index
            .get_urls(&requirement.package, &requirement.version)
            .await?;
        for url in urls.into_iter().filter(|u| u.is_sdist()) {
            self.get_file(&requirement.package, &url.filename, None).await?;
            cached.push(url.filename);
        }
        Ok(())
    }

    /// Every locally stored package.
    pub async fn list_packages(&self) -> Result<Vec<PackageName>> {
        self.store.list_packages().await
    }

    /// Every locally stored file of `package`.
    pub async fn local_files(&self, package: &PackageName) -> Result<Vec<ArtifactRecord>> {
        self.store.list_files(package).await
    }
}
