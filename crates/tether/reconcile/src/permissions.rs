//! Invoke permission grants

use crate::error::Result;
use tether_gateway::{AddPermissionRequest, GatewayClient};
use tether_types::{naming, ApiId, DurableId};
use tracing::{debug, warn};

/// Outcome of a permission grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    Granted,
    /// The statement already existed
    AlreadyGranted,
}

/// Allow the gateway to invoke a function for a resource of the API
///
/// A `Conflict` means the statement exists already and is swallowed. Any
/// other failure is returned.
pub async fn grant_invoke_permission(
    gateway: &dyn GatewayClient,
    api_id: &ApiId,
    durable_id: &DurableId,
    resource: &str,
) -> Result<PermissionOutcome> {
    let request = AddPermissionRequest {
        action: naming::INVOKE_ACTION.to_string(),
        function_name: durable_id.to_string(),
        principal: naming::GATEWAY_PRINCIPAL.to_string(),
        source_arn: naming::source_arn(durable_id, api_id, resource),
        statement_id: naming::permission_statement_id(durable_id),
    };

    match gateway.grant_invoke_permission(request).await {
        Ok(()) => {
            debug!(function = %durable_id.function_name(), resource, "Granted invoke permission");
            Ok(PermissionOutcome::Granted)
        }
        Err(err) if err.is_conflict() => {
            warn!(function = %durable_id.function_name(), resource, code = %err.code, "Invoke permission already exists");
            Ok(PermissionOutcome::AlreadyGranted)
        }
        Err(err) => Err(err.into()),
    }
}
