//! API resolution by deterministic name

use crate::error::Result;
use tether_gateway::{CreateApiRequest, GatewayClient, ProtocolType};
use tether_types::{ApiIdentity, ApiSettings};
use tracing::{info, instrument, warn};

/// Outcome of find-or-create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedApi {
    pub identity: ApiIdentity,
    pub created: bool,
}

/// Finds (or creates) the single API owned by a deployment unit
///
/// Not transactional: two concurrent runs may both create an API with the
/// same name. Deployments are assumed to have a single writer.
pub struct ApiResolver<'a> {
    gateway: &'a dyn GatewayClient,
    settings: &'a ApiSettings,
}

impl<'a> ApiResolver<'a> {
    pub fn new(gateway: &'a dyn GatewayClient, settings: &'a ApiSettings) -> Self {
        Self { gateway, settings }
    }

    /// Find the API by name, without side effects
    #[instrument(skip(self), fields(api_name = %self.settings.name))]
    pub async fn resolve(&self) -> Result<Option<ApiIdentity>> {
        let apis = self.gateway.list_apis().await?;
        let found = apis.into_iter().find(|api| api.name == self.settings.name);

        Ok(found.map(|api| {
            if api.protocol_type != ProtocolType::Websocket {
                warn!(api_id = %api.api_id, protocol = ?api.protocol_type, "API with matching name is not a websocket API");
            }
            ApiIdentity::new(api.api_id, self.settings)
        }))
    }

    /// Find the API by name, creating it when absent
    #[instrument(skip(self), fields(api_name = %self.settings.name))]
    pub async fn resolve_or_create(&self) -> Result<ResolvedApi> {
        if let Some(identity) = self.resolve().await? {
            info!(api_id = %identity.api_id, "Using existing websocket API");
            return Ok(ResolvedApi {
                identity,
                created: false,
            });
        }

        let created = self
            .gateway
            .create_api(CreateApiRequest {
                name: self.settings.name.clone(),
                protocol_type: ProtocolType::Websocket,
                route_selection_expression: self.settings.route_selection_expression.clone(),
            })
            .await?;

        info!(api_id = %created.api_id, "Created websocket API");

        Ok(ResolvedApi {
            identity: ApiIdentity::new(created.api_id, self.settings),
            created: true,
        })
    }
}
