//! # pypicache — Binary Entry Point
//!
//! Builds the configured artifact store and upstream client, then serves
//! the HTTP front end. With `--regenerate-indexes` it rebuilds the bucket's
//! static HTML indexes and exits instead.

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use pypicache_api::config::{Cli, StoreMode};
use pypicache_api::state::AppState;
use pypicache_pypi::PyPiClient;
use pypicache_store::{ArtifactStore, DiskArtifactStore, ObjectStoreArtifactStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .init();
    tracing::info!(debug = cli.debug, mode = ?cli.mode, "starting pypicache");

    if cli.regenerate_indexes && cli.mode != StoreMode::Amazon {
        bail!("--regenerate-indexes requires --mode amazon");
    }

    let store: Arc<dyn ArtifactStore> = match cli.mode {
        StoreMode::Disk => {
            let root = cli.disk_root();
            tracing::info!(root = %root.display(), "using disk store");
            Arc::new(DiskArtifactStore::new(root))
        }
        StoreMode::Amazon => {
            let s3 = ObjectStoreArtifactStore::amazon(&cli.amazon_config())
                .context("failed to configure S3 store")?;
            if cli.regenerate_indexes {
                let report = s3.regenerate_indexes().await?;
                tracing::info!(files = report.files, packages = report.packages, "indexes regenerated");
                return Ok(());
            }
            Arc::new(s3)
        }
    };

    let pypi_config = cli.pypi_config()?;
    tracing::info!(index = %pypi_config.index_url, timeout_secs = pypi_config.timeout_secs, "upstream index");
    let index = Arc::new(PyPiClient::new(pypi_config)?);

    let app = pypicache_api::app(AppState::new(store, index));

    let addr = cli.socket_addr();
    tracing::info!("pypicache listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
