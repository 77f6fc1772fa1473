//! escale — Elasticsearch node controller with AWS Auto Scaling groups.
//!
//! # Usage
//!
//! ```text
//! escale add    --host es.internal -g es-data --desired 5
//! escale remove --host es.internal -g es-data [--remove-node-name es-2]
//! escale nodes  --host es.internal
//! ```
//!
//! Flags not given on the command line are read from `.escale.toml`
//! (`-f` to point elsewhere). Any error exits with status 1.

use clap::{Parser, Subcommand};
use tracing::warn;

use escale_orchestrator::{CancelHandle, CancelSignal};

mod commands;
mod options;

use options::{AddArgs, NodesArgs, RemoveArgs};

#[derive(Parser)]
#[command(
    name = "escale",
    about = "Elasticsearch node controller with AWS Auto Scaling Group",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add Elasticsearch nodes.
    ///
    /// Disables shard allocation, raises the Auto Scaling group's desired
    /// capacity, waits for the new nodes to join, then re-enables allocation.
    Add(AddArgs),
    /// Remove an Elasticsearch node.
    ///
    /// Drains shards off one data node, detaches its instance from the Auto
    /// Scaling group, terminates it, and clears allocation exclusions.
    Remove(RemoveArgs),
    /// List Elasticsearch nodes
    Nodes(NodesArgs),
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,escale=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Add(args) => commands::add::add(args, cancel_on_interrupt()).await,
        Commands::Remove(args) => commands::remove::remove(args, cancel_on_interrupt()).await,
        Commands::Nodes(args) => commands::nodes::nodes(args).await,
        Commands::Version => commands::version::version(),
    }
}

/// First Ctrl-C cancels the running operation; a second one exits.
fn cancel_on_interrupt() -> CancelSignal {
    let (handle, signal) = CancelHandle::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("interrupt received, stopping at the next safe point (Ctrl-C again to exit now)");
        handle.cancel();
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
    signal
}
