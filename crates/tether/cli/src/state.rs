//! Gateway snapshot file

use crate::error::{CliError, CliResult};
use std::path::Path;
use tether_gateway::{GatewaySnapshot, InMemoryGateway};
use tracing::debug;

/// Restore a gateway from a snapshot file, or start empty if it does not exist
pub fn load(path: Option<&Path>) -> CliResult<InMemoryGateway> {
    let Some(path) = path.filter(|p| p.exists()) else {
        return Ok(InMemoryGateway::new());
    };

    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: GatewaySnapshot = serde_json::from_str(&raw).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), apis = snapshot.apis.len(), "Loaded gateway state");
    Ok(InMemoryGateway::from_snapshot(snapshot))
}

/// Write the gateway state to a snapshot file
pub fn save(gateway: &InMemoryGateway, path: &Path) -> CliResult<()> {
    let snapshot = gateway.snapshot();
    let json = serde_json::to_string_pretty(&snapshot).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), apis = snapshot.apis.len(), "Saved gateway state");
    Ok(())
}
