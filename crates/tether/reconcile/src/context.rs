//! Reconcile Context - Execution environment for reconcile strategies
//!
//! Built once per converge from the resolved API and the extracted desired
//! state, then shared read-only by every concurrent branch.

use crate::authorizer::{AuthorizerDeduplicator, AuthorizerOutcome};
use crate::error::{ReconcileError, Result};
use crate::events::EventSink;
use crate::permissions::{self, PermissionOutcome};
use futures::future::try_join_all;
use std::sync::Arc;
use tether_gateway::{
    AuthorizationType, CreateIntegrationRequest, CreateRouteRequest, CreateRouteResponseRequest,
    GatewayClient, GatewayOperation, IntegrationType, RouteSummary,
};
use tether_types::{
    naming, ApiIdentity, AuthorizerId, AuthorizerTarget, DesiredState, DurableId, FunctionBinding,
    IntegrationId, RouteId, RouteSpec, TetherEvent,
};
use tracing::{debug, info, instrument, warn};

/// Outcome of a route creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Created(RouteSummary),
    /// A route with the same key already existed
    Conflict,
}

/// Context provided to reconcile strategies for gateway operations
pub struct ReconcileContext {
    gateway: Arc<dyn GatewayClient>,
    api: ApiIdentity,
    desired: DesiredState,
    authorizers: AuthorizerDeduplicator,
    events: EventSink,
}

impl ReconcileContext {
    pub fn new(
        gateway: Arc<dyn GatewayClient>,
        api: ApiIdentity,
        desired: DesiredState,
        events: EventSink,
    ) -> Self {
        Self {
            gateway,
            api,
            desired,
            authorizers: AuthorizerDeduplicator::new(),
            events,
        }
    }

    pub fn api(&self) -> &ApiIdentity {
        &self.api
    }

    pub fn desired(&self) -> &DesiredState {
        &self.desired
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    /// Delete every route on the API, waiting for all deletions
    #[instrument(skip(self), fields(api_id = %self.api.api_id))]
    pub async fn clear_routes(&self) -> Result<usize> {
        let routes = self.gateway.list_routes(&self.api.api_id).await?;
        let count = routes.len();

        try_join_all(routes.iter().map(|route| async move {
            debug!(route_key = %route.route_key, route_id = %route.route_id, "Deleting route");
            self.gateway
                .delete_route(&self.api.api_id, &route.route_id)
                .await
        }))
        .await?;

        info!(count, "Cleared routes");
        self.events.emit(TetherEvent::RoutesCleared {
            api_id: self.api.api_id.clone(),
            count,
        });
        Ok(count)
    }

    /// Create the proxy integration backing a function's routes
    #[instrument(skip(self, binding), fields(api_id = %self.api.api_id, function = %binding.name))]
    pub async fn create_integration(&self, binding: &FunctionBinding) -> Result<IntegrationId> {
        let integration = self
            .gateway
            .create_integration(CreateIntegrationRequest {
                api_id: self.api.api_id.clone(),
                integration_type: IntegrationType::AwsProxy,
                integration_method: "POST".to_string(),
                integration_uri: naming::invocation_uri(&self.api.region, &binding.durable_id),
            })
            .await?;

        info!(integration_id = %integration.integration_id, "Created integration");
        self.events.emit(TetherEvent::IntegrationCreated {
            function: binding.name.clone(),
            integration_id: integration.integration_id.clone(),
        });
        Ok(integration.integration_id)
    }

    /// Allow the gateway to invoke a function for `resource`
    pub async fn grant_invoke_permission(
        &self,
        durable_id: &DurableId,
        resource: &str,
    ) -> Result<PermissionOutcome> {
        let outcome = permissions::grant_invoke_permission(
            self.gateway.as_ref(),
            &self.api.api_id,
            durable_id,
            resource,
        )
        .await?;

        if outcome == PermissionOutcome::AlreadyGranted {
            self.events.emit(TetherEvent::ConflictTolerated {
                operation: GatewayOperation::GrantInvokePermission.to_string(),
                detail: naming::permission_statement_id(durable_id),
            });
        }
        Ok(outcome)
    }

    /// Authorizer to bind to a route, created or reused as needed
    ///
    /// Only `$connect` routes carry an authorizer. A declared authorizer
    /// without identity sources, or naming an unknown function, is ignored.
    #[instrument(skip(self, route), fields(api_id = %self.api.api_id, route_key = %route.route_key))]
    pub async fn resolve_route_authorizer(
        &self,
        route: &RouteSpec,
    ) -> Result<Option<AuthorizerOutcome>> {
        let Some(spec) = route.effective_authorizer() else {
            return Ok(None);
        };

        if spec.identity_sources.is_empty() {
            warn!("Authorizer declares no identity sources, route stays unauthorized");
            return Ok(None);
        }

        let durable_id = match &spec.target {
            AuthorizerTarget::Arn(raw) => {
                DurableId::parse(raw).map_err(|source| ReconcileError::InvalidDurableId {
                    subject: format!("authorizer of route {}", route.route_key),
                    source,
                })?
            }
            AuthorizerTarget::Function(name) => match self.desired.durable_id_of(name) {
                Some(id) => id.clone(),
                None => {
                    warn!(authorizer = %name, "Authorizer function is not deployed, route stays unauthorized");
                    return Ok(None);
                }
            },
        };

        let outcome = self
            .authorizers
            .ensure(
                self.gateway.as_ref(),
                &self.api,
                &durable_id,
                &spec.identity_sources,
            )
            .await?;

        if outcome.created {
            self.events.emit(TetherEvent::AuthorizerCreated {
                authorizer_id: outcome.authorizer_id.clone(),
                name: outcome.name.clone().unwrap_or_default(),
            });
        } else {
            self.events.emit(TetherEvent::AuthorizerReused {
                authorizer_id: outcome.authorizer_id.clone(),
            });
        }
        Ok(Some(outcome))
    }

    /// Create a route bound to an integration
    ///
    /// A route key that already exists is tolerated. The existing route is
    /// not compared with the desired one.
    #[instrument(skip(self, route, authorizer_id), fields(api_id = %self.api.api_id, route_key = %route.route_key))]
    pub async fn create_route(
        &self,
        integration_id: &IntegrationId,
        route: &RouteSpec,
        authorizer_id: Option<&AuthorizerId>,
    ) -> Result<RouteOutcome> {
        let authorization_type = match authorizer_id {
            Some(_) => AuthorizationType::Custom,
            None => AuthorizationType::None,
        };

        let request = CreateRouteRequest {
            api_id: self.api.api_id.clone(),
            route_key: route.route_key.clone(),
            target: integration_id.route_target(),
            authorization_type,
            authorizer_id: authorizer_id.cloned(),
            route_response_selection_expression: route.route_response_selection_expression.clone(),
        };

        match self.gateway.create_route(request).await {
            Ok(created) => {
                info!(route_id = %created.route_id, ?authorization_type, "Created route");
                self.events.emit(TetherEvent::RouteCreated {
                    route_key: created.route_key.clone(),
                    route_id: created.route_id.clone(),
                });
                Ok(RouteOutcome::Created(created))
            }
            Err(err) if err.is_conflict() => {
                warn!(code = %err.code, message = %err.message, "Route key already exists, keeping the existing route");
                self.events.emit(TetherEvent::ConflictTolerated {
                    operation: GatewayOperation::CreateRoute.to_string(),
                    detail: route.route_key.clone(),
                });
                Ok(RouteOutcome::Conflict)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Create the `$default` route response of a route
    pub async fn create_default_route_response(&self, route_id: &RouteId) -> Result<()> {
        let response = self
            .gateway
            .create_route_response(CreateRouteResponseRequest {
                api_id: self.api.api_id.clone(),
                route_id: route_id.clone(),
                route_response_key: naming::DEFAULT_ROUTE_RESPONSE_KEY.to_string(),
            })
            .await?;
        debug!(%route_id, route_response_id = %response.route_response_id, "Created route response");
        Ok(())
    }
}
