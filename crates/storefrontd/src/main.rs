//! Storefront cart and session daemon
//!
//! Serves the cart actions, cart views and product variant lookups over HTTP,
//! backed either by a remote commerce API or by an in-memory demo catalogue.

use core::net::{AddrParseError, IpAddr, SocketAddr};
use std::env::var;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::install;
use eyre::{OptionExt, Result as EyreResult};
use storefront_commerce::{CommerceApi, GraphQlClient};
use storefront_server::config::DEFAULT_ADDR;
use tracing::{info, warn};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{registry, EnvFilter};

mod config;
mod demo;

use config::StorefrontConfig;

/// Storefront cart and session service
#[derive(Debug, Parser)]
#[command(
    name = "storefrontd",
    about = "Storefront cart and session service",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Sets the address to listen on
    /// Valid: `3000`, `127.0.0.1`, `127.0.0.1:3000` [env: PORT]
    #[clap(short, long, value_name = "URI")]
    #[clap(verbatim_doc_comment, value_parser = addr_from_str)]
    pub listen: Option<SocketAddr>,

    /// Configuration file path (optional, uses environment variables if not provided)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Serve an in-memory demo catalogue instead of the commerce API
    #[arg(long)]
    pub mock: bool,
}

#[tokio::main]
async fn main() -> EyreResult<()> {
    setup()?;

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => StorefrontConfig::load(&path)?,
        None => StorefrontConfig::from_env()?,
    };

    if let Some(listen) = cli.listen {
        config.listen = listen;
    }

    config.validate(cli.mock)?;

    let api: Arc<dyn CommerceApi> = if cli.mock {
        info!("Serving the demo catalogue");
        Arc::new(demo::catalogue().await)
    } else {
        let commerce = config
            .commerce
            .as_ref()
            .ok_or_eyre("Missing PUBLIC_STORE_URL")?;

        info!(store_url = %commerce.store_url, "Using remote commerce API");
        Arc::new(GraphQlClient::new(commerce)?)
    };

    storefront_server::start(config.server_config(), api).await
}

/// Installs the log subscriber and the eyre report handler. Storefront crates
/// log at `info` unless `RUST_LOG` says otherwise.
fn setup() -> EyreResult<()> {
    let directives = format!(
        "storefrontd=info,storefront_=info,{}",
        var("RUST_LOG").unwrap_or_default()
    );

    registry()
        .with(EnvFilter::builder().parse(directives)?)
        .with(layer())
        .init();

    install()
}

/// Port taken from `PORT`, the convention of most hosting platforms.
fn env_port() -> Option<u16> {
    let port = var("PORT").ok()?;

    port.parse()
        .inspect_err(|err| warn!(%port, %err, "Ignoring invalid PORT"))
        .ok()
}

/// `--listen` takes a port, a host, or both. A bare host listens on `PORT`
/// when set, the default port otherwise.
fn addr_from_str(s: &str) -> Result<SocketAddr, AddrParseError> {
    if let Ok(port) = s.parse::<u16>() {
        return Ok(SocketAddr::new(DEFAULT_ADDR.ip(), port));
    }

    if let Ok(host) = s.parse::<IpAddr>() {
        let port = env_port().unwrap_or_else(|| DEFAULT_ADDR.port());
        return Ok(SocketAddr::new(host, port));
    }

    s.parse()
}
