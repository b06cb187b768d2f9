//! HTML pages rendered by the front end.

use askama::Template;
use axum::response::Html;
use pypicache_core::{ArtifactRecord, PackageName};

use crate::error::AppError;

/// Landing page with upload forms.
#[derive(Template)]
#[template(path = "landing.html")]
pub struct LandingPage;

/// Index of every locally stored package.
#[derive(Template)]
#[template(path = "simple_index.html")]
pub struct SimpleIndex<'a> {
    pub packages: &'a [PackageName],
}

/// Local file listing for one package, with md5 fragments for pip.
#[derive(Template)]
#[template(path = "local_package.html")]
pub struct LocalPackagePage<'a> {
    pub package: &'a PackageName,
    pub records: &'a [ArtifactRecord],
}

/// Render `page`, turning a template failure into a 500.
pub fn render(page: impl Template) -> Result<Html<String>, AppError> {
    page.render()
        .map(Html)
        .map_err(|e| AppError::Internal(format!("template rendering failed: {e}")))
}
