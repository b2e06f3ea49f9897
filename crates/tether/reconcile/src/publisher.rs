//! Deployment publishing

use crate::error::Result;
use tether_gateway::{GatewayClient, StageRequest};
use tether_types::{ApiIdentity, DeploymentId};
use tracing::{info, instrument};

/// Outcome of a publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub deployment_id: DeploymentId,
    /// Whether the stage did not exist and was created
    pub stage_created: bool,
}

/// Snapshots the API and points its stage at the snapshot
pub struct DeploymentPublisher<'a> {
    gateway: &'a dyn GatewayClient,
}

impl<'a> DeploymentPublisher<'a> {
    pub fn new(gateway: &'a dyn GatewayClient) -> Self {
        Self { gateway }
    }

    /// Create a deployment and move the stage to it
    ///
    /// The stage is updated first and only created when the update reports
    /// it missing. Any other update failure is returned.
    #[instrument(skip(self, api), fields(api_id = %api.api_id, stage = %api.stage))]
    pub async fn publish(&self, api: &ApiIdentity) -> Result<PublishOutcome> {
        let deployment_id = self.gateway.create_deployment(&api.api_id).await?;
        let request = StageRequest {
            api_id: api.api_id.clone(),
            stage_name: api.stage.clone(),
            deployment_id: deployment_id.clone(),
        };

        let stage_created = match self.gateway.update_stage(request.clone()).await {
            Ok(()) => false,
            Err(err) if err.is_not_found() => {
                self.gateway.create_stage(request).await?;
                true
            }
            Err(err) => return Err(err.into()),
        };

        info!(%deployment_id, stage_created, "Published deployment");

        Ok(PublishOutcome {
            deployment_id,
            stage_created,
        })
    }
}
