//! Vortex - distributed storage network
//!
//! CLI entry point for a Vortex node.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod cli;
mod settings;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so join instructions on stdout stay copyable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vortex=info,vortex_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();
    let config = settings::load_config()?;

    let app = app::AppInfo::new(cli.mode());
    info!(app_id = %app.id, mode = %app.mode, "Starting {} v{}", app.name, app.version);

    cli::run(cli, config, &app).await
}
