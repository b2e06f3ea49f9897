//! CLI error types

use std::path::PathBuf;
use tether_reconcile::ReconcileError;
use thiserror::Error;

/// Errors surfaced by the `tether` binary
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid environment overrides: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

pub type CliResult<T> = Result<T, CliError>;
