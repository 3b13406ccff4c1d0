//! `vortex deploy` — run this host as a Vortex node until interrupted

use crate::app::AppInfo;
use crate::settings::AppConfig;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use vortex_core::{spawn_token_sweeper, Node};

/// Run the deploy command
pub async fn run(config: &AppConfig, app: &AppInfo) -> Result<()> {
    let node = Arc::new(Node::with_config(config.node_config())?);

    let identity = node.identity();
    info!(
        app_id = %app.id,
        node_id = %identity.id,
        node_name = %identity.name,
        host = %identity.host,
        port = identity.port,
        "Node deployed"
    );

    println!();
    println!("  Vortex node");
    println!("  {}", "-".repeat(40));
    println!("  ID:    {}", identity.id);
    println!("  Name:  {}", identity.name);
    println!("  Addr:  {}:{}", identity.host, identity.port);
    println!();
    println!("  Press Ctrl-C to stop.");
    println!();

    let cancel = CancellationToken::new();
    let sweeper = if config.sweeper.enabled {
        Some(spawn_token_sweeper(
            node.clone(),
            config.sweeper.interval(),
            cancel.clone(),
        ))
    } else {
        info!("Token sweeper disabled by configuration");
        None
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Shutdown requested");

    cancel.cancel();
    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            warn!("Token sweeper ended abnormally: {}", e);
        }
    }

    Ok(())
}
