//! Tether CLI - Drives the websocket lifecycle hooks of a service
//!
//! Runs the same hooks a deployment tool would call after its own deploy,
//! remove and info steps. Gateway state lives in a snapshot file so
//! successive runs see each other's changes.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tether_reconcile::{LifecycleHooks, WebsocketApiManager, WebsocketsLifecycle};
use tether_types::naming;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod output;
mod outputs;
mod state;

use config::ManifestOverrides;
use error::CliResult;

/// Tether CLI application
#[derive(Parser)]
#[command(name = "tether")]
#[command(about = "Tether - WebSocket API reconciliation for serverless services", long_about = None)]
#[command(version)]
struct Cli {
    /// Service manifest path
    #[arg(short, long, env = "TETHER_CONFIG", default_value = "tether.yml")]
    config: PathBuf,

    /// Stack outputs JSON file holding the function durable ids
    #[arg(long, env = "TETHER_OUTPUTS")]
    outputs: Option<PathBuf>,

    /// Gateway snapshot file, loaded before and saved after the command
    #[arg(long, env = "TETHER_STATE")]
    state: Option<PathBuf>,

    /// Stage, overriding the manifest
    #[arg(short, long)]
    stage: Option<String>,

    /// Region, overriding the manifest
    #[arg(short, long)]
    region: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Converge the websocket API and publish it
    Deploy,
    /// Delete the websocket API
    Remove,
    /// Show the websocket URLs
    Info,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Deploy => "deploy",
            Commands::Remove => "remove",
            Commands::Info => "info",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter.into());

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().without_time())
            .init();
    }

    let command = cli.command;
    run(cli)
        .await
        .with_context(|| format!("tether {} failed", command.name()))
}

async fn run(cli: Cli) -> CliResult<()> {
    let overrides = ManifestOverrides {
        stage: cli.stage.clone(),
        region: cli.region.clone(),
    };
    let manifest = config::load_manifest(&cli.config, &overrides, None)?;

    let stack_name = naming::stack_name(&manifest.service, &manifest.provider.stage);
    let stack_outputs = match &cli.outputs {
        Some(path) => outputs::load(path, &stack_name)?,
        None => tether_gateway::InMemoryStackOutputs::new(),
    };

    let gateway = Arc::new(state::load(cli.state.as_deref())?);
    let manager = WebsocketApiManager::new(gateway.clone(), Arc::new(stack_outputs), manifest);
    let mut events = manager.subscribe();
    let lifecycle = WebsocketsLifecycle::new(manager, Arc::new(output::TerminalConsole));

    let result = match cli.command {
        Commands::Deploy => lifecycle.on_post_deploy().await,
        Commands::Remove => lifecycle.on_post_remove().await,
        Commands::Info => lifecycle.on_post_info().await,
    };

    while let Ok(envelope) = events.try_recv() {
        debug!(severity = ?envelope.severity, event = ?envelope.event, "Reconcile event");
    }

    // Saved on failure too: partial changes are real
    if let Some(path) = &cli.state {
        state::save(&gateway, path)?;
    }

    result?;
    if matches!(cli.command, Commands::Deploy | Commands::Remove) {
        output::print_success(&format!("{} finished", cli.command.name()));
    }
    Ok(())
}
