//! In-memory gateway provider
//!
//! Suitable for development and testing. Reproduces the provider behaviour
//! the reconciliation engine depends on and records every call in order.

use crate::client::*;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tether_types::{ApiId, AuthorizerId, DeploymentId, IntegrationId, RouteId};
use tracing::debug;
use uuid::Uuid;

/// Everything the provider holds for one API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRecord {
    pub summary: ApiSummary,
    #[serde(default)]
    pub routes: BTreeMap<RouteId, RouteSummary>,
    #[serde(default)]
    pub route_responses: BTreeMap<RouteId, Vec<RouteResponseSummary>>,
    #[serde(default)]
    pub integrations: BTreeMap<IntegrationId, IntegrationSummary>,
    /// Creation order is preserved
    #[serde(default)]
    pub authorizers: Vec<AuthorizerSummary>,
    #[serde(default)]
    pub deployments: Vec<DeploymentId>,
    /// Stage name to deployment
    #[serde(default)]
    pub stages: BTreeMap<String, DeploymentId>,
}

impl ApiRecord {
    fn new(summary: ApiSummary) -> Self {
        Self {
            summary,
            routes: BTreeMap::new(),
            route_responses: BTreeMap::new(),
            integrations: BTreeMap::new(),
            authorizers: Vec::new(),
            deployments: Vec::new(),
            stages: BTreeMap::new(),
        }
    }

    /// Route with the given key, if present
    pub fn route_by_key(&self, route_key: &str) -> Option<&RouteSummary> {
        self.routes.values().find(|r| r.route_key == route_key)
    }

    /// Sorted route keys
    pub fn route_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.routes.values().map(|r| r.route_key.clone()).collect();
        keys.sort();
        keys
    }
}

/// Invoke permission recorded on a function policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub statement_id: String,
    pub principal: String,
    pub action: String,
    pub source_arn: String,
}

/// One recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub sequence: u64,
    pub operation: GatewayOperation,
    pub api_id: Option<ApiId>,
    pub detail: String,
}

/// Serializable provider state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySnapshot {
    #[serde(default)]
    pub apis: Vec<ApiRecord>,
    /// Function durable id to its granted permissions
    #[serde(default)]
    pub permissions: BTreeMap<String, Vec<PermissionGrant>>,
}

/// In-memory provider
pub struct InMemoryGateway {
    apis: DashMap<ApiId, ApiRecord>,
    permissions: DashMap<String, Vec<PermissionGrant>>,
    calls: DashMap<u64, RecordedCall>,
    sequence: AtomicU64,
    faults: DashMap<GatewayOperation, Vec<GatewayError>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            apis: DashMap::new(),
            permissions: DashMap::new(),
            calls: DashMap::new(),
            sequence: AtomicU64::new(0),
            faults: DashMap::new(),
        }
    }

    /// Restore provider state from a snapshot
    pub fn from_snapshot(snapshot: GatewaySnapshot) -> Self {
        let gateway = Self::new();
        for record in snapshot.apis {
            gateway.apis.insert(record.summary.api_id.clone(), record);
        }
        for (function, grants) in snapshot.permissions {
            gateway.permissions.insert(function, grants);
        }
        gateway
    }

    /// Capture provider state
    pub fn snapshot(&self) -> GatewaySnapshot {
        let mut apis: Vec<ApiRecord> = self.apis.iter().map(|r| r.value().clone()).collect();
        apis.sort_by(|a, b| a.summary.api_id.cmp(&b.summary.api_id));
        GatewaySnapshot {
            apis,
            permissions: self
                .permissions
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
        }
    }

    /// Make the next call of `operation` fail with `error`
    ///
    /// Queued faults are consumed in order, one per call.
    pub fn fail_next(&self, operation: GatewayOperation, error: GatewayError) {
        self.faults.entry(operation).or_default().push(error);
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        let mut calls: Vec<RecordedCall> = self.calls.iter().map(|c| c.value().clone()).collect();
        calls.sort_by_key(|c| c.sequence);
        calls
    }

    /// Number of calls of one operation
    pub fn call_count(&self, operation: GatewayOperation) -> usize {
        self.calls
            .iter()
            .filter(|c| c.value().operation == operation)
            .count()
    }

    /// Number of calls that change remote state
    pub fn mutation_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| c.value().operation.is_mutation())
            .count()
    }

    /// Forget recorded calls, keeping state
    pub fn clear_calls(&self) {
        self.calls.clear();
    }

    /// Current record of an API
    pub fn api(&self, api_id: &ApiId) -> Option<ApiRecord> {
        self.apis.get(api_id).map(|r| r.value().clone())
    }

    /// Current record of the API with the given name
    pub fn api_by_name(&self, name: &str) -> Option<ApiRecord> {
        self.apis
            .iter()
            .find(|r| r.value().summary.name == name)
            .map(|r| r.value().clone())
    }

    pub fn api_count(&self) -> usize {
        self.apis.len()
    }

    /// Permissions granted on a function
    pub fn permissions_for(&self, function_name: &str) -> Vec<PermissionGrant> {
        self.permissions
            .get(function_name)
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    fn record(
        &self,
        operation: GatewayOperation,
        api_id: Option<&ApiId>,
        detail: impl Into<String>,
    ) -> Result<()> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let detail = detail.into();
        debug!(%operation, api_id = ?api_id, detail = %detail, "gateway call");
        self.calls.insert(
            sequence,
            RecordedCall {
                sequence,
                operation,
                api_id: api_id.cloned(),
                detail,
            },
        );

        let fault = self.faults.get_mut(&operation).and_then(|mut queued| {
            if queued.is_empty() {
                None
            } else {
                Some(queued.remove(0))
            }
        });
        match fault {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn with_api<T>(&self, api_id: &ApiId, f: impl FnOnce(&mut ApiRecord) -> Result<T>) -> Result<T> {
        let mut record = self
            .apis
            .get_mut(api_id)
            .ok_or_else(|| GatewayError::not_found(format!("Invalid API identifier specified {}", api_id)))?;
        f(record.value_mut())
    }

    fn generate_id(len: usize) -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(len);
        id
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GatewayClient for InMemoryGateway {
    async fn list_apis(&self) -> Result<Vec<ApiSummary>> {
        self.record(GatewayOperation::ListApis, None, "")?;
        let mut apis: Vec<ApiSummary> = self.apis.iter().map(|r| r.value().summary.clone()).collect();
        apis.sort_by(|a, b| a.api_id.cmp(&b.api_id));
        Ok(apis)
    }

    async fn create_api(&self, request: CreateApiRequest) -> Result<ApiSummary> {
        self.record(GatewayOperation::CreateApi, None, request.name.as_str())?;
        let summary = ApiSummary {
            api_id: ApiId::new(Self::generate_id(10)),
            name: request.name,
            protocol_type: request.protocol_type,
            route_selection_expression: request.route_selection_expression,
        };
        self.apis
            .insert(summary.api_id.clone(), ApiRecord::new(summary.clone()));
        Ok(summary)
    }

    async fn delete_api(&self, api_id: &ApiId) -> Result<()> {
        self.record(GatewayOperation::DeleteApi, Some(api_id), "")?;
        // Child objects go with the API
        self.apis
            .remove(api_id)
            .map(|_| ())
            .ok_or_else(|| GatewayError::not_found(format!("Invalid API identifier specified {}", api_id)))
    }

    async fn list_routes(&self, api_id: &ApiId) -> Result<Vec<RouteSummary>> {
        self.record(GatewayOperation::ListRoutes, Some(api_id), "")?;
        self.with_api(api_id, |api| Ok(api.routes.values().cloned().collect()))
    }

    async fn create_route(&self, request: CreateRouteRequest) -> Result<RouteSummary> {
        self.record(
            GatewayOperation::CreateRoute,
            Some(&request.api_id),
            request.route_key.as_str(),
        )?;
        self.with_api(&request.api_id, |api| {
            if api.route_by_key(&request.route_key).is_some() {
                return Err(GatewayError::conflict(format!(
                    "Route with key {} already exists for this API",
                    request.route_key
                )));
            }

            let integration = request
                .target
                .strip_prefix("integrations/")
                .map(IntegrationId::new)
                .filter(|id| api.integrations.contains_key(id));
            if integration.is_none() {
                return Err(GatewayError::bad_request(format!(
                    "Invalid target {}",
                    request.target
                )));
            }

            if let Some(authorizer_id) = &request.authorizer_id {
                if !api.authorizers.iter().any(|a| &a.authorizer_id == authorizer_id) {
                    return Err(GatewayError::bad_request(format!(
                        "Invalid authorizer identifier {}",
                        authorizer_id
                    )));
                }
            }

            let route = RouteSummary {
                route_id: RouteId::new(Self::generate_id(7)),
                route_key: request.route_key,
                target: Some(request.target),
                authorization_type: request.authorization_type,
                authorizer_id: request.authorizer_id,
                route_response_selection_expression: request.route_response_selection_expression,
            };
            api.routes.insert(route.route_id.clone(), route.clone());
            Ok(route)
        })
    }

    async fn delete_route(&self, api_id: &ApiId, route_id: &RouteId) -> Result<()> {
        self.record(GatewayOperation::DeleteRoute, Some(api_id), route_id.as_str())?;
        self.with_api(api_id, |api| {
            api.route_responses.remove(route_id);
            api.routes
                .remove(route_id)
                .map(|_| ())
                .ok_or_else(|| GatewayError::not_found(format!("Invalid Route identifier specified {}", route_id)))
        })
    }

    async fn create_route_response(
        &self,
        request: CreateRouteResponseRequest,
    ) -> Result<RouteResponseSummary> {
        self.record(
            GatewayOperation::CreateRouteResponse,
            Some(&request.api_id),
            format!("{} {}", request.route_id, request.route_response_key),
        )?;
        self.with_api(&request.api_id, |api| {
            if !api.routes.contains_key(&request.route_id) {
                return Err(GatewayError::not_found(format!(
                    "Invalid Route identifier specified {}",
                    request.route_id
                )));
            }
            let responses = api.route_responses.entry(request.route_id.clone()).or_default();
            if responses
                .iter()
                .any(|r| r.route_response_key == request.route_response_key)
            {
                return Err(GatewayError::conflict(format!(
                    "RouteResponse with key {} already exists",
                    request.route_response_key
                )));
            }
            let response = RouteResponseSummary {
                route_response_id: Self::generate_id(6),
                route_response_key: request.route_response_key,
            };
            responses.push(response.clone());
            Ok(response)
        })
    }

    async fn create_integration(
        &self,
        request: CreateIntegrationRequest,
    ) -> Result<IntegrationSummary> {
        self.record(
            GatewayOperation::CreateIntegration,
            Some(&request.api_id),
            request.integration_uri.as_str(),
        )?;
        self.with_api(&request.api_id, |api| {
            // Identical parameters yield the existing integration
            if let Some(existing) = api.integrations.values().find(|i| {
                i.integration_type == request.integration_type
                    && i.integration_method == request.integration_method
                    && i.integration_uri == request.integration_uri
            }) {
                return Ok(existing.clone());
            }

            let integration = IntegrationSummary {
                integration_id: IntegrationId::new(Self::generate_id(7)),
                integration_type: request.integration_type,
                integration_method: request.integration_method,
                integration_uri: request.integration_uri,
            };
            api.integrations
                .insert(integration.integration_id.clone(), integration.clone());
            Ok(integration)
        })
    }

    async fn list_authorizers(&self, api_id: &ApiId) -> Result<Vec<AuthorizerSummary>> {
        self.record(GatewayOperation::ListAuthorizers, Some(api_id), "")?;
        self.with_api(api_id, |api| Ok(api.authorizers.clone()))
    }

    async fn create_authorizer(
        &self,
        request: CreateAuthorizerRequest,
    ) -> Result<AuthorizerSummary> {
        self.record(
            GatewayOperation::CreateAuthorizer,
            Some(&request.api_id),
            request.name.as_str(),
        )?;
        self.with_api(&request.api_id, |api| {
            let authorizer = AuthorizerSummary {
                authorizer_id: AuthorizerId::new(Self::generate_id(6)),
                name: request.name,
                authorizer_type: request.authorizer_type,
                authorizer_uri: request.authorizer_uri,
                identity_source: request.identity_source,
            };
            api.authorizers.push(authorizer.clone());
            Ok(authorizer)
        })
    }

    async fn grant_invoke_permission(&self, request: AddPermissionRequest) -> Result<()> {
        self.record(
            GatewayOperation::GrantInvokePermission,
            None,
            format!("{} {}", request.function_name, request.statement_id),
        )?;
        let mut grants = self.permissions.entry(request.function_name.clone()).or_default();
        if grants.iter().any(|g| g.statement_id == request.statement_id) {
            return Err(GatewayError::from_provider(
                "ResourceConflictException",
                format!(
                    "The statement id ({}) provided already exists. Please provide a new statement id, or remove the existing statement.",
                    request.statement_id
                ),
            ));
        }
        grants.push(PermissionGrant {
            statement_id: request.statement_id,
            principal: request.principal,
            action: request.action,
            source_arn: request.source_arn,
        });
        Ok(())
    }

    async fn create_deployment(&self, api_id: &ApiId) -> Result<DeploymentId> {
        self.record(GatewayOperation::CreateDeployment, Some(api_id), "")?;
        self.with_api(api_id, |api| {
            let deployment_id = DeploymentId::new(Self::generate_id(6));
            api.deployments.push(deployment_id.clone());
            Ok(deployment_id)
        })
    }

    async fn update_stage(&self, request: StageRequest) -> Result<()> {
        self.record(
            GatewayOperation::UpdateStage,
            Some(&request.api_id),
            request.stage_name.as_str(),
        )?;
        self.with_api(&request.api_id, |api| {
            if !api.deployments.contains(&request.deployment_id) {
                return Err(GatewayError::bad_request(format!(
                    "Invalid deployment identifier {}",
                    request.deployment_id
                )));
            }
            match api.stages.get_mut(&request.stage_name) {
                Some(deployment) => {
                    *deployment = request.deployment_id;
                    Ok(())
                }
                None => Err(GatewayError::not_found(format!(
                    "Invalid stage identifier specified {}",
                    request.stage_name
                ))),
            }
        })
    }

    async fn create_stage(&self, request: StageRequest) -> Result<()> {
        self.record(
            GatewayOperation::CreateStage,
            Some(&request.api_id),
            request.stage_name.as_str(),
        )?;
        self.with_api(&request.api_id, |api| {
            if !api.deployments.contains(&request.deployment_id) {
                return Err(GatewayError::bad_request(format!(
                    "Invalid deployment identifier {}",
                    request.deployment_id
                )));
            }
            if api.stages.contains_key(&request.stage_name) {
                return Err(GatewayError::conflict(format!(
                    "Stage {} already exists",
                    request.stage_name
                )));
            }
            api.stages.insert(request.stage_name, request.deployment_id);
            Ok(())
        })
    }
}
