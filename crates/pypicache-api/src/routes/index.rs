//! # Index Pages
//!
//! | Method | Path | Source |
//! |--------|------|--------|
//! | GET | `/` | static landing page |
//! | GET | `/simple/` | locally stored packages |
//! | GET | `/simple/{package}/` | upstream simple page, proxied verbatim |
//! | GET | `/local/{package}/` | locally stored files of one package |
//!
//! Each path is also served without its trailing slash.

use axum::extract::{Path, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use pypicache_core::PackageName;

use crate::error::AppError;
use crate::state::AppState;
use crate::templates::{self, LandingPage, LocalPackagePage, SimpleIndex};

/// Build the index router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/simple", get(simple_index))
        .route("/simple/", get(simple_index))
        .route("/simple/{package}", get(upstream_simple_page))
        .route("/simple/{package}/", get(upstream_simple_page))
        .route("/local/{package}", get(local_package_page))
        .route("/local/{package}/", get(local_package_page))
}

async fn landing() -> Result<Html<String>, AppError> {
    templates::render(LandingPage)
}

async fn simple_index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let packages = state.cache.list_packages().await?;
    templates::render(SimpleIndex { packages: &packages })
}

async fn upstream_simple_page(
    State(state): State<AppState>,
    Path(package): Path<String>,
) -> Result<Html<String>, AppError> {
    let package = PackageName::new(&package)?;
    let page = state.index.simple_page(&package).await?;
    Ok(Html(page))
}

async fn local_package_page(
    State(state): State<AppState>,
    Path(package): Path<String>,
) -> Result<Html<String>, AppError> {
    let package = PackageName::new(&package)?;
    let records = state.cache.local_files(&package).await?;
    tracing::debug!(package = %package, files = records.len(), "rendering local listing");
    templates::render(LocalPackagePage {
        package: &package,
        records: &records,
    })
}
