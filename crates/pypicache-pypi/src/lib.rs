//! # pypicache-pypi — Upstream Index Client
//!
//! Typed async access to a PyPI-compatible index:
//!
//! | Operation | Request | Notes |
//! |-----------|---------|-------|
//! | [`PackageIndex::get_versions`] | `POST {index}pypi` (XML-RPC `package_releases`) | upstream order |
//! | [`PackageIndex::get_urls`] | `GET {index}pypi/{package}/{version}/json` | `urls` array |
//! | [`PackageIndex::fetch_file`] | `GET {index}packages/{pyver or source}/{first}/{package}/{filename}` | raw bytes |
//! | [`PackageIndex::simple_page`] | `GET {index}simple/{package}/` | body proxied verbatim |
//!
//! Package names, versions and filenames are percent-encoded as individual
//! path segments, so a `#`, `?` or space can never change which upstream
//! resource is requested.
//!
//! ## Status Mapping
//!
//! `404` becomes [`PackageCacheError::NotFound`]. Any other non-200 status,
//! a transport failure, or an undecodable body becomes
//! [`PackageCacheError::Remote`]. Requests are never retried.

pub mod config;
pub mod xmlrpc;

pub use config::{ConfigError, PyPiConfig};

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use pypicache_core::{ArtifactPath, PackageCacheError, PackageName, Result, UpstreamUrlInfo};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::xmlrpc::Param;

/// Read-only view of an upstream package index.
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Every released version of `package`, in upstream order.
    async fn get_versions(&self, package: &PackageName, show_hidden: bool) -> Result<Vec<String>>;

    /// Distribution files advertised for one version.
    async fn get_urls(&self, package: &PackageName, version: &str) -> Result<Vec<UpstreamUrlInfo>>;

    /// Download one distribution file.
    async fn fetch_file(
        &self,
        package: &PackageName,
        filename: &str,
        python_version: Option<&str>,
    ) -> Result<Bytes>;

    /// The upstream simple-index page for `package`.
    async fn simple_page(&self, package: &PackageName) -> Result<String>;
}

/// JSON API release document. Only `urls` is used.
#[derive(Debug, Deserialize)]
struct ReleaseDocument {
    #[serde(default)]
    urls: Vec<UpstreamUrlInfo>,
}

/// reqwest-backed [`PackageIndex`].
#[derive(Debug, Clone)]
pub struct PyPiClient {
    http: reqwest::Client,
    index_url: url::Url,
}

impl PyPiClient {
    pub fn new(config: PyPiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("pypicache/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| remote("client_init", e))?;
        Ok(Self {
            http,
            index_url: config.index_url,
        })
    }

    /// The normalized index root.
    pub fn index_url(&self) -> &url::Url {
        &self.index_url
    }

    /// The index root extended by `segments`, each percent-encoded.
    fn endpoint<I>(&self, segments: I) -> Result<url::Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.index_url.clone();
        url.path_segments_mut()
            .map_err(|()| remote(self.index_url.as_str(), "index URL cannot take a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET `url`, mapping 404 to `NotFound` and any other non-200 to `Remote`.
    async fn get(&self, url: url::Url) -> Result<reqwest::Response> {
        let endpoint = url.to_string();
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| remote(&endpoint, e))?;
        let url = endpoint.as_str();

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(PackageCacheError::NotFound(format!("can't locate {url}")));
        }

        if resp.status() != StatusCode::OK {
            return Err(unexpected_status(url, resp).await);
        }

        Ok(resp)
    }
}

fn remote(endpoint: &str, err: impl std::fmt::Display) -> PackageCacheError {
    PackageCacheError::Remote {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    }
}

async fn unexpected_status(endpoint: &str, resp: reqwest::Response) -> PackageCacheError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    PackageCacheError::Remote {
        endpoint: endpoint.to_string(),
        message: format!("unexpected status {status}: {body}"),
    }
}

#[async_trait]
impl PackageIndex for PyPiClient {
    async fn get_versions(&self, package: &PackageName, show_hidden: bool) -> Result<Vec<String>> {
        let url = self.endpoint(["pypi"])?.to_string();
        let body = xmlrpc::encode_call(
            "package_releases",
            &[Param::Str(package.as_str()), Param::Bool(show_hidden)],
        );

        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| remote(&url, e))?;
        if resp.status() != StatusCode::OK {
            return Err(unexpected_status(&url, resp).await);
        }
        let text = resp.text().await.map_err(|e| remote(&url, e))?;

        let versions = xmlrpc::decode_string_array(&text).map_err(|e| remote(&url, e))?;
        tracing::debug!(package = %package, ?versions, "got versions");
        Ok(versions)
    }

    async fn get_urls(&self, package: &PackageName, version: &str) -> Result<Vec<UpstreamUrlInfo>> {
        let url = self.endpoint(["pypi", package.as_str(), version, "json"])?;
        tracing::info!(url = %url, "fetching JSON info");

        let resp = self.get(url.clone()).await?;
        let doc: ReleaseDocument = resp.json().await.map_err(|e| remote(url.as_str(), e))?;
        Ok(doc.urls)
    }

    async fn fetch_file(
        &self,
        package: &PackageName,
        filename: &str,
        python_version: Option<&str>,
    ) -> Result<Bytes> {
        let path = ArtifactPath::new(package, filename)?;
        let url = self.endpoint(path.upstream_segments(python_version))?;
        tracing::debug!(url = %url, "fetching file");

        let resp = self.get(url.clone()).await?;
        resp.bytes().await.map_err(|e| remote(url.as_str(), e))
    }

    async fn simple_page(&self, package: &PackageName) -> Result<String> {
        // Trailing empty segment keeps the canonical `simple/{package}/` form.
        let url = self.endpoint(["simple", package.as_str(), ""])?;
        tracing::debug!(url = %url, "fetching simple page");

        let resp = self.get(url.clone()).await?;
        resp.text().await.map_err(|e| remote(url.as_str(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(index: &str) -> PyPiClient {
        PyPiClient::new(PyPiConfig::from_url_str(index).unwrap()).unwrap()
    }

    #[test]
    fn endpoints_join_under_normalized_root() {
        let c = client("http://mirror.example/root");
        assert_eq!(c.endpoint(["pypi"]).unwrap().as_str(), "http://mirror.example/root/pypi");
        assert_eq!(c.index_url().as_str(), "http://mirror.example/root/");
    }

    #[test]
    fn endpoint_segments_are_encoded() {
        let c = client("https://pypi.example/");
        let url = c.endpoint(["pypi", "six", "1.0#frag?x=1 y", "json"]).unwrap();
        assert_eq!(url.as_str(), "https://pypi.example/pypi/six/1.0%23frag%3Fx=1%20y/json");
        assert!(url.fragment().is_none());
        assert!(url.query().is_none());
    }

    #[test]
    fn simple_endpoint_keeps_trailing_slash() {
        let c = client("https://pypi.example/");
        let url = c.endpoint(["simple", "six", ""]).unwrap();
        assert_eq!(url.as_str(), "https://pypi.example/simple/six/");
    }

    #[test]
    fn release_document_tolerates_missing_urls() {
        let doc: ReleaseDocument = serde_json::from_str(r#"{"info": {}}"#).unwrap();
        assert!(doc.urls.is_empty());
    }
}
