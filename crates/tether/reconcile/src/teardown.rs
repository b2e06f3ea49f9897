//! API teardown

use crate::error::Result;
use crate::resolver::ApiResolver;
use tether_gateway::GatewayClient;
use tether_types::{ApiIdentity, ApiSettings};
use tracing::{info, instrument};

/// Delete a resolved API
///
/// Routes, integrations, authorizers and stages go with it.
#[instrument(skip_all, fields(api_id = %api.api_id))]
pub async fn delete_api(gateway: &dyn GatewayClient, api: &ApiIdentity) -> Result<()> {
    gateway.delete_api(&api.api_id).await?;
    info!(api_name = %api.name, "Removed websocket API");
    Ok(())
}

/// Delete the API owned by these settings, if it exists
///
/// Returns the removed API, or `None` when there was nothing to remove.
#[instrument(skip_all, fields(api_name = %settings.name))]
pub async fn destroy(
    gateway: &dyn GatewayClient,
    settings: &ApiSettings,
) -> Result<Option<ApiIdentity>> {
    match ApiResolver::new(gateway, settings).resolve().await? {
        Some(api) => {
            delete_api(gateway, &api).await?;
            Ok(Some(api))
        }
        None => {
            info!("No websocket API to remove");
            Ok(None)
        }
    }
}
