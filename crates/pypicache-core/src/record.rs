//! Stored and upstream-advertised artifact records.

use serde::{Deserialize, Serialize};

use crate::package::PackageName;

/// One file held by an artifact store.
///
/// Produced by listing a store. `md5` is computed from the stored bytes at
/// listing time, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Owning package.
    pub package: PackageName,
    /// Bucket the package is sharded under.
    pub firstletter: char,
    /// Basename of the stored file.
    pub filename: String,
    /// Lowercase hex MD5 of the stored content.
    pub md5: String,
    /// Where a client can download this file.
    pub url: String,
}

/// Distribution kind as reported by the PyPI JSON API `packagetype` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageType {
    /// Source distribution.
    Sdist,
    /// Wheel.
    BdistWheel,
    /// Egg.
    BdistEgg,
    /// Windows installer.
    BdistWininst,
    /// Dumb binary archive.
    BdistDumb,
    /// MSI installer.
    BdistMsi,
    /// RPM package.
    BdistRpm,
    /// Anything the index introduces later.
    #[serde(other)]
    Other,
}

/// One distribution file advertised upstream for a package version.
///
/// Ephemeral: fetched per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamUrlInfo {
    /// Basename of the distribution file.
    pub filename: String,
    /// Distribution kind.
    pub packagetype: PackageType,
    /// The JSON API calls this `md5_digest`.
    #[serde(default, rename = "md5_digest", alias = "md5")]
    pub md5: Option<String>,
    /// Upstream download URL.
    pub url: String,
}

impl UpstreamUrlInfo {
    /// Whether this entry is a source distribution.
    pub fn is_sdist(&self) -> bool {
        self.packagetype == PackageType::Sdist
    }
}
