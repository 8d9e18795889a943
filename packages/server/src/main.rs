#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Entry point for the migration map server.
//!
//! Configuration comes from the environment (see
//! [`migration_map_server::ServerConfig`]); command-line flags override it.

use std::path::PathBuf;

use clap::Parser;
use migration_map_server::ServerConfig;

#[derive(Parser)]
#[command(
    name = "migration_map_server",
    about = "Serve the India internal migration map"
)]
struct Cli {
    /// Migration flow CSV (overrides `MIGRATION_FLOWS_PATH`)
    #[arg(long)]
    flows: Option<PathBuf>,

    /// State boundary `GeoJSON` (overrides `STATE_BOUNDARIES_PATH`)
    #[arg(long)]
    boundaries: Option<PathBuf>,

    /// Address to bind (overrides `BIND_ADDR`)
    #[arg(long)]
    bind_addr: Option<String>,

    /// Port to bind (overrides `PORT`)
    #[arg(long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let mut config = ServerConfig::from_env();
    if let Some(flows) = cli.flows {
        config.flows_path = flows;
    }
    if let Some(boundaries) = cli.boundaries {
        config.boundaries_path = boundaries;
    }
    if let Some(bind_addr) = cli.bind_addr {
        config.bind_addr = bind_addr;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    migration_map_server::run_server(config).await?;

    Ok(())
}
