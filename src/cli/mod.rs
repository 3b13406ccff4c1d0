//! CLI module for Vortex
//!
//! Provides commands:
//! - `join-token`: Generate a single-use join token
//! - `deploy`: Run this host as a Vortex node

use crate::app::{AppInfo, AppMode};
use crate::settings::AppConfig;
use clap::{Parser, Subcommand};
use vortex_core::format_error_for_cli;

pub mod deploy;
pub mod join_token;

/// Base command name used when rendering instructions
pub const COMMAND_BASE: &str = "vortex";

/// Vortex network CLI
#[derive(Parser, Debug)]
#[command(name = "vortex")]
#[command(about = "Vortex storage network node")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a single-use join token to the Vortex network
    JoinToken {
        /// Host the joining node should contact (defaults to this host's primary address)
        #[arg(short = 'H', long)]
        host: Option<String>,
    },
    /// Deploy current host as node of the Vortex network
    Deploy,
}

impl Cli {
    /// Application mode implied by the selected command
    pub fn mode(&self) -> AppMode {
        match self.command {
            Some(Commands::Deploy) => AppMode::Node,
            _ => AppMode::Cli,
        }
    }
}

/// Run the CLI command
///
/// Core errors are printed in their user-friendly form and end the process
/// with exit code 1; anything else is returned to `main`.
pub async fn run(cli: Cli, config: AppConfig, app: &AppInfo) -> anyhow::Result<()> {
    let result = match cli.command {
        Some(Commands::JoinToken { host }) => join_token::run(&config, host),
        Some(Commands::Deploy) => deploy::run(&config, app).await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    };

    if let Some(report) = result.as_ref().err().and_then(cli_report) {
        eprintln!("{}", report);
        std::process::exit(1);
    }
    result
}

/// User-facing report for a core error, `None` for any other error.
fn cli_report(error: &anyhow::Error) -> Option<String> {
    error
        .downcast_ref::<vortex_core::Error>()
        .map(format_error_for_cli)
}
