//! # Uploads and Batch Caching
//!
//! - `POST /uploadpackage/` — multipart field `package`; the package name
//!   is taken from the uploaded filename (`<package>-<version>.<ext>`).
//! - `POST /requirements.txt` — multipart field `requirements`; every
//!   `package==version` line is cached and a JSON report returned.

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use pypicache_core::{package_from_filename, ProcessingReport};

use crate::error::AppError;
use crate::routes::packages::{UploadResponse, MAX_UPLOAD_BYTES};
use crate::state::AppState;

/// Build the upload router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/uploadpackage", post(upload_package))
        .route("/uploadpackage/", post(upload_package))
        .route("/requirements.txt", post(cache_requirements))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// One file field pulled out of a multipart body.
struct UploadedField {
    file_name: Option<String>,
    data: Bytes,
}

/// Find the field called `name`, skipping any others.
async fn take_field(multipart: &mut Multipart, name: &str) -> Result<Option<UploadedField>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some(name) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?;
        return Ok(Some(UploadedField { file_name, data }));
    }
    Ok(None)
}

async fn upload_package(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let field = take_field(&mut multipart, "package")
        .await?
        .ok_or_else(|| AppError::BadRequest("Missing package data.".into()))?;
    let filename = field
        .file_name
        .ok_or_else(|| AppError::BadRequest("Uploaded package has no filename.".into()))?;

    let package = package_from_filename(&filename)?;
    tracing::debug!(package = %package, filename = %filename, "parsed package from upload");

    state.store.put(&package, &filename, field.data).await?;
    tracing::info!(package = %package, filename = %filename, "package uploaded");
    Ok(UploadResponse::ok())
}

async fn cache_requirements(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessingReport>, AppError> {
    let field = take_field(&mut multipart, "requirements")
        .await?
        .ok_or_else(|| AppError::BadRequest("Missing requirements data.".into()))?;
    let text = String::from_utf8(field.data.to_vec())
        .map_err(|_| AppError::BadRequest("requirements must be UTF-8 text".into()))?;

    let report = state.cache.cache_requirements(&text).await;
    tracing::info!(
        cached = report.cached.len(),
        unparseable = report.unparseable.len(),
        failed = report.failed.len(),
        errored = report.errored.len(),
        rejected = report.lines_rejected(),
        "processed requirements"
    );
    Ok(Json(report))
}
