//! Websocket API Manager - High-level reconcile operations
//!
//! The WebsocketApiManager is the main entry point. Each operation builds
//! its own scratch state (settings, desired state, resolved API) and
//! threads it explicitly through the pipeline.

use crate::context::ReconcileContext;
use crate::error::Result;
use crate::events::EventSink;
use crate::extractor;
use crate::inspector;
use crate::publisher::DeploymentPublisher;
use crate::resolver::ApiResolver;
use crate::strategies::{self, ReconcileReport, ReconcileStrategy};
use crate::teardown;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tether_gateway::{GatewayClient, StackOutputSource};
use tether_types::{
    ApiDescription, ApiId, ApiIdentity, ApiSettings, DeploymentId, DesiredState, ServiceManifest,
    TetherEvent, TetherEventEnvelope,
};
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument};

/// Result of a converge run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergeReport {
    pub api_id: ApiId,
    pub api_name: String,
    pub api_created: bool,
    pub websocket_url: String,
    pub deployment_id: DeploymentId,
    pub stage_created: bool,
    pub routes: ReconcileReport,
    pub duration_ms: u64,
}

/// Orchestrates converge, destroy and describe for one service
pub struct WebsocketApiManager {
    gateway: Arc<dyn GatewayClient>,
    outputs: Arc<dyn StackOutputSource>,
    manifest: ServiceManifest,
    settings: ApiSettings,
    strategy: Arc<dyn ReconcileStrategy>,
    event_tx: broadcast::Sender<TetherEventEnvelope>,
}

impl WebsocketApiManager {
    pub fn new(
        gateway: Arc<dyn GatewayClient>,
        outputs: Arc<dyn StackOutputSource>,
        manifest: ServiceManifest,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(1024);
        let settings = ApiSettings::from_manifest(&manifest);
        let strategy = strategies::create_strategy(manifest.provider.reconcile_strategy);

        Self {
            gateway,
            outputs,
            manifest,
            settings,
            strategy,
            event_tx,
        }
    }

    /// Replace the strategy selected by the manifest
    pub fn with_strategy(mut self, strategy: Arc<dyn ReconcileStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn manifest(&self) -> &ServiceManifest {
        &self.manifest
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Subscribe to reconcile events
    pub fn subscribe(&self) -> broadcast::Receiver<TetherEventEnvelope> {
        self.event_tx.subscribe()
    }

    /// Extract the desired state from the manifest and the stack outputs
    pub async fn desired_state(&self) -> Result<DesiredState> {
        extractor::load_desired_state(&self.manifest, self.outputs.as_ref()).await
    }

    /// Find the API without creating it
    pub async fn resolve_api(&self) -> Result<Option<ApiIdentity>> {
        ApiResolver::new(self.gateway.as_ref(), &self.settings)
            .resolve()
            .await
    }

    /// Converge the remote API onto the manifest
    ///
    /// Returns `None` without any gateway call when no websocket route is
    /// declared.
    pub async fn converge(&self) -> Result<Option<ConvergeReport>> {
        if !self.manifest.declares_websocket_routes() {
            debug!(service = %self.manifest.service, "No websocket routes declared");
            return Ok(None);
        }
        let desired = self.desired_state().await?;
        self.converge_desired(desired).await
    }

    /// Converge onto an already extracted desired state
    #[instrument(skip(self, desired), fields(api_name = %self.settings.name, strategy = %self.strategy.name()))]
    pub async fn converge_desired(&self, desired: DesiredState) -> Result<Option<ConvergeReport>> {
        if desired.is_empty() {
            debug!("Desired state has no websocket functions");
            return Ok(None);
        }

        let sink = EventSink::new(self.event_tx.clone());
        match self.run_converge(desired, &sink).await {
            Ok(report) => Ok(Some(report)),
            Err(e) => {
                error!(error = %e, "Converge failed");
                sink.emit(TetherEvent::ConvergeFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_converge(&self, desired: DesiredState, sink: &EventSink) -> Result<ConvergeReport> {
        let started = Instant::now();

        let resolved = ApiResolver::new(self.gateway.as_ref(), &self.settings)
            .resolve_or_create()
            .await?;
        let api = resolved.identity;
        if resolved.created {
            sink.emit(TetherEvent::ApiCreated {
                api_id: api.api_id.clone(),
                name: api.name.clone(),
            });
        } else {
            sink.emit(TetherEvent::ApiResolved {
                api_id: api.api_id.clone(),
                name: api.name.clone(),
            });
        }

        let ctx = ReconcileContext::new(self.gateway.clone(), api.clone(), desired, sink.clone());
        let routes = self.strategy.reconcile(&ctx).await?;

        let published = DeploymentPublisher::new(self.gateway.as_ref())
            .publish(&api)
            .await?;
        sink.emit(TetherEvent::DeploymentPublished {
            deployment_id: published.deployment_id.clone(),
            stage: api.stage.clone(),
            stage_created: published.stage_created,
        });

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        sink.emit(TetherEvent::ConvergeCompleted {
            api_id: api.api_id.clone(),
            duration_ms,
        });

        info!(
            api_id = %api.api_id,
            routes_created = routes.routes_created,
            duration_ms,
            "Converge completed"
        );

        Ok(ConvergeReport {
            websocket_url: api.websocket_url(),
            api_id: api.api_id,
            api_name: api.name,
            api_created: resolved.created,
            deployment_id: published.deployment_id,
            stage_created: published.stage_created,
            routes,
            duration_ms,
        })
    }

    /// Delete a resolved API
    pub async fn delete_api(&self, api: &ApiIdentity) -> Result<()> {
        teardown::delete_api(self.gateway.as_ref(), api).await?;
        EventSink::new(self.event_tx.clone()).emit(TetherEvent::ApiRemoved {
            api_id: api.api_id.clone(),
        });
        Ok(())
    }

    /// Delete the API if it exists
    pub async fn destroy(&self) -> Result<Option<ApiIdentity>> {
        let removed = teardown::destroy(self.gateway.as_ref(), &self.settings).await?;
        if let Some(api) = &removed {
            EventSink::new(self.event_tx.clone()).emit(TetherEvent::ApiRemoved {
                api_id: api.api_id.clone(),
            });
        }
        Ok(removed)
    }

    /// Describe the deployed API
    pub async fn describe(&self) -> Result<Option<ApiDescription>> {
        if !self.manifest.declares_websocket_routes() {
            return Ok(None);
        }
        let desired = self.desired_state().await?;
        inspector::describe(self.gateway.as_ref(), &self.settings, &desired).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_gateway::{GatewayOperation, InMemoryGateway, InMemoryStackOutputs};
    use tether_types::{FunctionDefinition, FunctionEvent, WebsocketEvent, WebsocketRoute};

    fn manifest(routes: &[&str]) -> ServiceManifest {
        let events = routes
            .iter()
            .map(|key| FunctionEvent {
                websocket: Some(WebsocketEvent::Route(WebsocketRoute {
                    route_key: key.to_string(),
                    authorizer: None,
                    route_response_selection_expression: None,
                })),
                ..Default::default()
            })
            .collect();
        let mut manifest = ServiceManifest {
            service: "svc".into(),
            ..Default::default()
        };
        manifest.functions.insert(
            "chat".into(),
            FunctionDefinition {
                handler: None,
                events,
            },
        );
        manifest
    }

    fn manager(gateway: Arc<InMemoryGateway>, manifest: ServiceManifest) -> WebsocketApiManager {
        let outputs = InMemoryStackOutputs::new();
        outputs.insert_function(
            "svc-dev",
            "chat",
            "arn:aws:lambda:us-east-1:123456789012:function:chat:3",
        );
        WebsocketApiManager::new(gateway, Arc::new(outputs), manifest)
    }

    #[tokio::test]
    async fn test_converge_publishes_events() {
        let gateway = Arc::new(InMemoryGateway::new());
        let manager = manager(gateway.clone(), manifest(&["$connect"]));
        let mut rx = manager.subscribe();

        let report = manager.converge().await.unwrap().unwrap();
        assert!(report.api_created);
        assert!(report.stage_created);
        assert_eq!(report.routes.routes_created, 1);

        let mut events = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            events.push(envelope);
        }
        assert!(matches!(events.first().map(|e| &e.event), Some(TetherEvent::ApiCreated { .. })));
        assert!(matches!(
            events.last().map(|e| &e.event),
            Some(TetherEvent::ConvergeCompleted { .. })
        ));
        let correlation = events[0].correlation_id.clone();
        assert!(events.iter().all(|e| e.correlation_id == correlation));
    }

    #[tokio::test]
    async fn test_converge_without_routes_is_noop() {
        let gateway = Arc::new(InMemoryGateway::new());
        let manager = manager(gateway.clone(), manifest(&[]));

        assert!(manager.converge().await.unwrap().is_none());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_converge_emits_event() {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway.fail_next(
            GatewayOperation::CreateApi,
            tether_gateway::GatewayError::from_provider("LimitExceededException", "too many apis"),
        );
        let manager = manager(gateway.clone(), manifest(&["send"]));
        let mut rx = manager.subscribe();

        assert!(manager.converge().await.is_err());
        let envelope = rx.try_recv().unwrap();
        assert!(matches!(envelope.event, TetherEvent::ConvergeFailed { .. }));
    }
}
