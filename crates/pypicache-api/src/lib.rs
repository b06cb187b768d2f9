//! # pypicache-api — HTTP Front End
//!
//! Serves a PyPI-compatible simple index backed by the cache coordinator.
//!
//! ## API Surface
//!
//! | Prefix                | Module                 | Purpose                     |
//! |-----------------------|------------------------|-----------------------------|
//! | `/`, `/simple/*`, `/local/*` | [`routes::index`] | HTML index pages        |
//! | `/packages/*`         | [`routes::packages`]   | cached downloads, raw PUT   |
//! | `/uploadpackage/`     | [`routes::upload`]     | multipart package upload    |
//! | `/requirements.txt`   | [`routes::upload`]     | batch cache fill            |
//! | `/health/*`           | this module            | liveness and readiness      |
//!
//! ## Middleware Stack
//!
//! ```text
//! TraceLayer → Handler
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod templates;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::index::router())
        .merge(routes::packages::router())
        .merge(routes::upload::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: returns 200 once the router is serving.
async fn readiness() -> &'static str {
    "ready"
}
