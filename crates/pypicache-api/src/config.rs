//! # Command Line Configuration
//!
//! `pypicache PREFIX [--mode disk|amazon] [--address ADDR] [--port PORT] ...`
//!
//! `PREFIX` is a directory in disk mode and a bucket name in amazon mode.
//! Upstream settings start from `PYPI_INDEX_URL` / `PYPI_TIMEOUT_SECS` and
//! are overridden by `--pypi-server` / `--timeout-secs`.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use pypicache_pypi::{ConfigError, PyPiConfig};
use pypicache_store::AmazonConfig;
use tracing_subscriber::EnvFilter;

/// Which artifact store backs the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreMode {
    /// Files under a local directory.
    Disk,
    /// Objects in an S3 bucket.
    Amazon,
}

/// A caching proxy for the Python package index.
#[derive(Parser, Debug)]
#[command(name = "pypicache", version, about, long_about = None)]
pub struct Cli {
    /// Package prefix, e.g. /tmp/packages. Or bucket name for amazon.
    pub prefix: String,

    #[arg(long, value_enum, default_value_t = StoreMode::Disk)]
    pub mode: StoreMode,

    /// Address to bind to.
    #[arg(long, default_value = "0.0.0.0")]
    pub address: IpAddr,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Turn on debug logging.
    #[arg(long)]
    pub debug: bool,

    /// Upstream index root.
    #[arg(long)]
    pub pypi_server: Option<String>,

    /// Upstream request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long)]
    pub aws_key: Option<String>,

    #[arg(long)]
    pub aws_secret_key: Option<String>,

    #[arg(long)]
    pub aws_region: Option<String>,

    /// Rebuild the bucket's static HTML indexes and exit (amazon mode only).
    #[arg(long)]
    pub regenerate_indexes: bool,
}

impl Cli {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    pub fn disk_root(&self) -> PathBuf {
        PathBuf::from(&self.prefix)
    }

    pub fn amazon_config(&self) -> AmazonConfig {
        AmazonConfig {
            bucket: self.prefix.clone(),
            region: self.aws_region.clone(),
            access_key_id: self.aws_key.clone(),
            secret_access_key: self.aws_secret_key.clone(),
        }
    }

    /// Upstream configuration: environment first, then flags.
    pub fn pypi_config(&self) -> Result<PyPiConfig, ConfigError> {
        let mut config = match &self.pypi_server {
            Some(server) => {
                let timeout = PyPiConfig::from_env()?.timeout_secs;
                PyPiConfig::from_url_str(server)?.with_timeout_secs(timeout)
            }
            None => PyPiConfig::from_env()?,
        };
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout_secs(secs);
        }
        Ok(config)
    }

    /// `RUST_LOG` wins; otherwise `debug` with `--debug`, else `info`.
    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if self.debug { "debug" } else { "info" })
        })
    }
}
