//! Gateway client trait and request/response shapes

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tether_types::{ApiId, AuthorizerId, DeploymentId, IntegrationId, RouteId};

/// Control-plane operations, used for logging and call accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatewayOperation {
    ListApis,
    CreateApi,
    DeleteApi,
    ListRoutes,
    CreateRoute,
    DeleteRoute,
    CreateRouteResponse,
    CreateIntegration,
    ListAuthorizers,
    CreateAuthorizer,
    GrantInvokePermission,
    CreateDeployment,
    UpdateStage,
    CreateStage,
}

impl GatewayOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayOperation::ListApis => "listApis",
            GatewayOperation::CreateApi => "createApi",
            GatewayOperation::DeleteApi => "deleteApi",
            GatewayOperation::ListRoutes => "listRoutes",
            GatewayOperation::CreateRoute => "createRoute",
            GatewayOperation::DeleteRoute => "deleteRoute",
            GatewayOperation::CreateRouteResponse => "createRouteResponse",
            GatewayOperation::CreateIntegration => "createIntegration",
            GatewayOperation::ListAuthorizers => "listAuthorizers",
            GatewayOperation::CreateAuthorizer => "createAuthorizer",
            GatewayOperation::GrantInvokePermission => "grantInvokePermission",
            GatewayOperation::CreateDeployment => "createDeployment",
            GatewayOperation::UpdateStage => "updateStage",
            GatewayOperation::CreateStage => "createStage",
        }
    }

    /// Whether the operation changes remote state
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            GatewayOperation::ListApis
                | GatewayOperation::ListRoutes
                | GatewayOperation::ListAuthorizers
        )
    }
}

impl fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtocolType {
    Websocket,
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrationType {
    AwsProxy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizerType {
    Request,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationType {
    #[default]
    None,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSummary {
    pub api_id: ApiId,
    pub name: String,
    pub protocol_type: ProtocolType,
    pub route_selection_expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateApiRequest {
    pub name: String,
    pub protocol_type: ProtocolType,
    pub route_selection_expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub route_id: RouteId,
    pub route_key: String,
    pub target: Option<String>,
    pub authorization_type: AuthorizationType,
    pub authorizer_id: Option<AuthorizerId>,
    pub route_response_selection_expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRouteRequest {
    pub api_id: ApiId,
    pub route_key: String,
    pub target: String,
    pub authorization_type: AuthorizationType,
    pub authorizer_id: Option<AuthorizerId>,
    pub route_response_selection_expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRouteResponseRequest {
    pub api_id: ApiId,
    pub route_id: RouteId,
    pub route_response_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteResponseSummary {
    pub route_response_id: String,
    pub route_response_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIntegrationRequest {
    pub api_id: ApiId,
    pub integration_type: IntegrationType,
    pub integration_method: String,
    pub integration_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationSummary {
    pub integration_id: IntegrationId,
    pub integration_type: IntegrationType,
    pub integration_method: String,
    pub integration_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizerSummary {
    pub authorizer_id: AuthorizerId,
    pub name: String,
    pub authorizer_type: AuthorizerType,
    pub authorizer_uri: String,
    pub identity_source: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAuthorizerRequest {
    pub api_id: ApiId,
    pub name: String,
    pub authorizer_type: AuthorizerType,
    pub authorizer_uri: String,
    pub identity_source: Vec<String>,
}

/// Grant of invoke permission on a function to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPermissionRequest {
    pub action: String,
    /// Durable id of the target function
    pub function_name: String,
    pub principal: String,
    pub source_arn: String,
    pub statement_id: String,
}

/// Points a stage at a deployment (used for both update and create)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRequest {
    pub api_id: ApiId,
    pub stage_name: String,
    pub deployment_id: DeploymentId,
}

/// Authenticated request/response access to the provider control plane
///
/// Every method fails with a classified [`crate::GatewayError`].
#[async_trait]
pub trait GatewayClient: Send + Sync {
    async fn list_apis(&self) -> Result<Vec<ApiSummary>>;

    async fn create_api(&self, request: CreateApiRequest) -> Result<ApiSummary>;

    async fn delete_api(&self, api_id: &ApiId) -> Result<()>;

    async fn list_routes(&self, api_id: &ApiId) -> Result<Vec<RouteSummary>>;

    async fn create_route(&self, request: CreateRouteRequest) -> Result<RouteSummary>;

    async fn delete_route(&self, api_id: &ApiId, route_id: &RouteId) -> Result<()>;

    async fn create_route_response(
        &self,
        request: CreateRouteResponseRequest,
    ) -> Result<RouteResponseSummary>;

    async fn create_integration(
        &self,
        request: CreateIntegrationRequest,
    ) -> Result<IntegrationSummary>;

    async fn list_authorizers(&self, api_id: &ApiId) -> Result<Vec<AuthorizerSummary>>;

    async fn create_authorizer(&self, request: CreateAuthorizerRequest)
        -> Result<AuthorizerSummary>;

    async fn grant_invoke_permission(&self, request: AddPermissionRequest) -> Result<()>;

    async fn create_deployment(&self, api_id: &ApiId) -> Result<DeploymentId>;

    async fn update_stage(&self, request: StageRequest) -> Result<()>;

    async fn create_stage(&self, request: StageRequest) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names() {
        assert_eq!(GatewayOperation::GrantInvokePermission.to_string(), "grantInvokePermission");
        assert!(GatewayOperation::CreateRoute.is_mutation());
        assert!(!GatewayOperation::ListAuthorizers.is_mutation());
    }

    #[test]
    fn test_wire_enum_names() {
        assert_eq!(
            serde_json::to_string(&ProtocolType::Websocket).unwrap(),
            "\"WEBSOCKET\""
        );
        assert_eq!(
            serde_json::to_string(&IntegrationType::AwsProxy).unwrap(),
            "\"AWS_PROXY\""
        );
        assert_eq!(
            serde_json::to_string(&AuthorizationType::Custom).unwrap(),
            "\"CUSTOM\""
        );
    }
}
