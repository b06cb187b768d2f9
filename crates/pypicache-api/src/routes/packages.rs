//! # Package Files
//!
//! | Method | Path | Action |
//! |--------|------|--------|
//! | GET | `/packages/{package}/{filename}` | cached read |
//! | GET | `/packages/source/{first}/{package}/{filename}` | cached read |
//! | GET | `/packages/{pyver}/{first}/{package}/{filename}` | cached read, upstream under `pyver` |
//! | PUT | `/packages/source/{first}/{package}/{filename}` | raw body stored as-is |
//!
//! The three read layouts share one wildcard route and are told apart by
//! segment count. The `{first}` segment is informational; the bucket is
//! always derived from the package name.

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use pypicache_core::{content_type_for, PackageName};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Python version segment used upstream for source distributions.
const SOURCE: &str = "source";

/// Success body for uploads.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub uploaded: &'static str,
}

impl UploadResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { uploaded: "ok" })
    }
}

/// A parsed `/packages/...` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRoute {
    /// `{package}/{filename}`
    Short { package: String, filename: String },
    /// `source/{first}/{package}/{filename}`
    Source { package: String, filename: String },
    /// `{pyver}/{first}/{package}/{filename}`
    Versioned {
        python_version: String,
        package: String,
        filename: String,
    },
}

impl FileRoute {
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        match segments.as_slice() {
            [package, filename] => Some(Self::Short {
                package: package.to_string(),
                filename: filename.to_string(),
            }),
            [SOURCE, _first, package, filename] => Some(Self::Source {
                package: package.to_string(),
                filename: filename.to_string(),
            }),
            [pyver, _first, package, filename] => Some(Self::Versioned {
                python_version: pyver.to_string(),
                package: package.to_string(),
                filename: filename.to_string(),
            }),
            _ => None,
        }
    }

    fn parts(&self) -> (&str, &str, Option<&str>) {
        match self {
            Self::Short { package, filename } | Self::Source { package, filename } => {
                (package.as_str(), filename.as_str(), None)
            }
            Self::Versioned {
                python_version,
                package,
                filename,
            } => (package.as_str(), filename.as_str(), Some(python_version.as_str())),
        }
    }
}

/// Build the package file router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/packages/{*path}",
        get(get_file)
            .put(put_source_file)
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    )
}

/// Serve `content` with a type inferred from `filename`.
pub fn file_response(filename: &str, content: Bytes) -> Response {
    ([(header::CONTENT_TYPE, content_type_for(filename))], content).into_response()
}

async fn get_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let route = FileRoute::parse(&path)
        .ok_or_else(|| AppError::NotFound(format!("no such file: /packages/{path}")))?;
    let (package, filename, python_version) = route.parts();
    let package = PackageName::new(package)?;

    let content = state
        .cache
        .get_file(&package, filename, python_version)
        .await?;
    Ok(file_response(filename, content))
}

async fn put_source_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    let Some(FileRoute::Source { package, filename }) = FileRoute::parse(&path) else {
        return Err(AppError::BadRequest(format!(
            "uploads go to /packages/source/{{first}}/{{package}}/{{filename}}, not /packages/{path}"
        )));
    };
    let package = PackageName::new(&package)?;

    tracing::info!(package = %package, filename = %filename, bytes = body.len(), "PUT upload");
    state.store.put(&package, &filename, body).await?;
    Ok(UploadResponse::ok())
}
