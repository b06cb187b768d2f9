//! # Object Storage Store
//!
//! Artifacts are objects keyed `packages/{first}/{package}/{filename}` in any
//! [`ObjectStore`]: Amazon S3 in production, `InMemory` in tests.
//!
//! ## URLs
//!
//! Record URLs are either pre-signed for one year with the signature query
//! stripped, or a fixed public base URL joined with the object key. Both
//! forms rely on objects being publicly readable: the S3 client sends
//! `x-amz-acl: public-read` on every request, so each artifact and index page
//! is written with the canned public-read ACL. Buckets with ACLs disabled
//! (object ownership "bucket owner enforced") reject such writes and need a
//! public-read bucket policy instead.
//!
//! ## Keys
//!
//! Object keys are percent-encoded path parts. Listings decode them back to
//! the stored filename, and artifacts found by a listing are read by their
//! listed location rather than a re-derived key.
//!
//! ## Static Indexes
//!
//! [`ObjectStoreArtifactStore::regenerate_indexes`] rewrites `flat.html`,
//! `index.html`, and one `packages/{first}/{package}/index.html` per package
//! so the bucket can be used as a plain static package index. It is an
//! offline maintenance job, never called on the request path.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use askama::Template;
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use object_store::aws::{AmazonS3Builder, S3ConditionalPut};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{
    Attribute, Attributes, ClientOptions, ObjectStore, PutMode, PutOptions, PutPayload,
};
use percent_encoding::percent_decode_str;
use pypicache_core::path::{package_prefix, ArtifactPath, PACKAGES_DIR};
use pypicache_core::{ArtifactRecord, PackageCacheError, PackageName, Result};
use url::Url;

use crate::pages::{BucketIndex, FlatIndex, IndexLink, PackagePage};
use crate::{md5_hex, not_found, ArtifactStore};

/// Lifetime of generated object URLs.
const PUBLIC_URL_EXPIRY: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Name of the generated per-package and top-level index pages.
const INDEX_PAGE: &str = "index.html";

/// Key of the generated flat listing of every file.
const FLAT_INDEX: &str = "flat.html";

/// Canned ACL applied to every object written through the S3 client.
const PUBLIC_READ_ACL: &str = "public-read";

/// Connection settings for an S3 bucket.
///
/// Unset credentials and region fall back to the standard `AWS_*`
/// environment variables.
#[derive(Clone, Default)]
pub struct AmazonConfig {
    pub bucket: String,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl std::fmt::Debug for AmazonConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmazonConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .finish()
    }
}

/// How record URLs are produced.
#[derive(Debug, Clone)]
enum UrlStrategy {
    Signed(Arc<dyn Signer>),
    Public(Url),
}

/// Summary of a [`regenerate_indexes`](ObjectStoreArtifactStore::regenerate_indexes) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexReport {
    pub files: usize,
    pub packages: usize,
}

/// An [`ArtifactStore`] backed by an object-store bucket.
#[derive(Debug, Clone)]
pub struct ObjectStoreArtifactStore {
    store: Arc<dyn ObjectStore>,
    urls: UrlStrategy,
}

impl ObjectStoreArtifactStore {
    /// Wrap `store`, building record URLs as `{public_base}{key}`.
    pub fn new(store: Arc<dyn ObjectStore>, public_base: Url) -> Self {
        Self {
            store,
            urls: UrlStrategy::Public(public_base),
        }
    }

    /// Wrap `store`, building record URLs with `signer`.
    pub fn with_signer(store: Arc<dyn ObjectStore>, signer: Arc<dyn Signer>) -> Self {
        Self {
            store,
            urls: UrlStrategy::Signed(signer),
        }
    }

    /// Connect to an S3 bucket.
    ///
    /// Conditional puts use ETag matching so that the write-once create is
    /// enforced by S3 itself.
    pub fn amazon(config: &AmazonConfig) -> Result<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&config.bucket)
            .with_conditional_put(S3ConditionalPut::ETagMatch)
            .with_client_options(ClientOptions::new().with_default_headers(public_read_headers()));
        if let Some(region) = &config.region {
            builder = builder.with_region(region);
        }
        if let Some(key) = &config.access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(secret) = &config.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        let s3 = Arc::new(builder.build().map_err(|e| PackageCacheError::Storage(e.to_string()))?);
        tracing::info!(bucket = %config.bucket, "connected to S3 bucket");
        let store: Arc<dyn ObjectStore> = s3.clone();
        Ok(Self::with_signer(store, s3))
    }

    async fn object_url(&self, location: &Path) -> Result<String> {
        match &self.urls {
            UrlStrategy::Signed(signer) => {
                let mut url = signer
                    .signed_url(http::Method::GET, location, PUBLIC_URL_EXPIRY)
                    .await
                    .map_err(|e| map_object_error(e, location.as_ref()))?;
                // Objects are public; the signature is not needed.
                url.set_query(None);
                Ok(url.to_string())
            }
            UrlStrategy::Public(base) => {
                let mut url = base.clone();
                url.path_segments_mut()
                    .map_err(|()| {
                        PackageCacheError::Storage(format!("public base {base} cannot hold object paths"))
                    })?
                    .pop_if_empty()
                    .extend(location.parts());
                Ok(url.to_string())
            }
        }
    }

    /// Read an object by its exact location.
    async fn read(&self, location: &Path) -> Result<Bytes> {
        tracing::debug!(key = %location, "reading object");
        self.store
            .get(location)
            .await
            .map_err(|e| map_object_error(e, location.as_ref()))?
            .bytes()
            .await
            .map_err(|e| map_object_error(e, location.as_ref()))
    }

    /// Every stored artifact as `(package, filename, location)`.
    async fn list_artifacts(&self, prefix: &str) -> Result<Vec<(PackageName, String, Path)>> {
        let prefix = Path::from(prefix);
        let objects: Vec<_> = self
            .store
            .list(Some(&prefix))
            .try_collect()
            .await
            .map_err(|e| map_object_error(e, prefix.as_ref()))?;

        let mut artifacts: Vec<_> = objects
            .into_iter()
            .filter_map(|meta| {
                let (package, filename) = parse_key(&meta.location)?;
                Some((package, filename, meta.location))
            })
            .collect();
        artifacts.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        Ok(artifacts)
    }

    async fn put_html(&self, key: &str, page: impl Template) -> Result<()> {
        let html = page
            .render()
            .map_err(|e| PackageCacheError::Storage(format!("rendering {key}: {e}")))?;
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, "text/html".into());
        let opts = PutOptions {
            mode: PutMode::Overwrite,
            attributes,
            ..Default::default()
        };
        let location = Path::from(key);
        tracing::debug!(key, bytes = html.len(), "writing index page");
        self.store
            .put_opts(&location, PutPayload::from(html), opts)
            .await
            .map_err(|e| map_object_error(e, key))?;
        Ok(())
    }

    /// Rebuild the static HTML indexes from a full bucket scan.
    pub async fn regenerate_indexes(&self) -> Result<IndexReport> {
        let artifacts = self.list_artifacts(PACKAGES_DIR).await?;

        let mut flat = Vec::with_capacity(artifacts.len());
        let mut per_package: BTreeMap<&PackageName, Vec<IndexLink>> = BTreeMap::new();
        for (package, filename, location) in &artifacts {
            let url = self.object_url(location).await?;
            flat.push(IndexLink::new(url.clone(), filename.as_str()));
            per_package
                .entry(package)
                .or_default()
                .push(IndexLink::new(url, filename.as_str()));
        }

        self.put_html(FLAT_INDEX, FlatIndex { links: &flat }).await?;

        let mut top = Vec::with_capacity(per_package.len());
        for (package, links) in &per_package {
            let prefix = package_prefix(package);
            let key = format!("{prefix}{INDEX_PAGE}");
            self.put_html(&key, PackagePage { package, links }).await?;
            top.push(IndexLink::new(prefix, package.as_str()));
        }
        self.put_html(INDEX_PAGE, BucketIndex { packages: &top }).await?;

        let report = IndexReport {
            files: artifacts.len(),
            packages: per_package.len(),
        };
        tracing::info!(files = report.files, packages = report.packages, "regenerated static indexes");
        Ok(report)
    }
}

/// Default headers that make every written object publicly readable.
fn public_read_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-amz-acl"),
        HeaderValue::from_static(PUBLIC_READ_ACL),
    );
    headers
}

/// Split `packages/{first}/{package}/{filename}` into its package and
/// decoded filename.
///
/// Keys outside that layout, and generated index pages, yield `None`.
fn parse_key(location: &Path) -> Option<(PackageName, String)> {
    let mut parts = location
        .parts()
        .map(|part| percent_decode_str(part.as_ref()).decode_utf8().map(|s| s.into_owned()));
    let (root, bucket, package, filename) = (
        parts.next()?.ok()?,
        parts.next()?.ok()?,
        parts.next()?.ok()?,
        parts.next()?.ok()?,
    );
    if parts.next().is_some() || root != PACKAGES_DIR || filename == INDEX_PAGE {
        return None;
    }
    let package = PackageName::new(&package).ok()?;
    if bucket != package.first_letter().to_string() {
        return None;
    }
    Some((package, filename))
}

fn map_object_error(err: object_store::Error, key: &str) -> PackageCacheError {
    match err {
        object_store::Error::NotFound { .. } => {
            PackageCacheError::NotFound(format!("object {key} not found"))
        }
        object_store::Error::AlreadyExists { .. } => {
            PackageCacheError::NotOverwriting(key.to_string())
        }
        other => PackageCacheError::Storage(other.to_string()),
    }
}

#[async_trait]
impl ArtifactStore for ObjectStoreArtifactStore {
    async fn list_packages(&self) -> Result<Vec<PackageName>> {
        let packages: BTreeSet<PackageName> = self
            .list_artifacts(PACKAGES_DIR)
            .await?
            .into_iter()
            .map(|(package, _, _)| package)
            .collect();
        Ok(packages.into_iter().collect())
    }

    async fn list_files(&self, package: &PackageName) -> Result<Vec<ArtifactRecord>> {
        let prefix = package_prefix(package);
        let mut records = Vec::new();
        for (found, filename, location) in self.list_artifacts(&prefix).await? {
            if &found != package {
                continue;
            }
            let content = self.read(&location).await?;
            records.push(ArtifactRecord {
                firstletter: package.first_letter(),
                package: found,
                md5: md5_hex(&content),
                url: self.object_url(&location).await?,
                filename,
            });
        }
        Ok(records)
    }

    async fn get(&self, package: &PackageName, filename: &str) -> Result<Bytes> {
        let path = ArtifactPath::new(package, filename)?;
        let location = Path::from(path.key());
        self.read(&location).await.map_err(|e| {
            if e.is_not_found() {
                not_found(package, filename)
            } else {
                e
            }
        })
    }

    async fn put(&self, package: &PackageName, filename: &str, content: Bytes) -> Result<()> {
        let path = ArtifactPath::new(package, filename)?;
        let location = Path::from(path.key());
        let size = content.len();

        self.store
            .put_opts(&location, PutPayload::from(content), PutOptions::from(PutMode::Create))
            .await
            .map_err(|e| map_object_error(e, &path.key()))?;

        tracing::info!(key = %location, bytes = size, "stored object");
        Ok(())
    }
}
