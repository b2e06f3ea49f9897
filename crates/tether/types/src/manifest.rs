//! Declared service configuration
//!
//! The manifest is the read-only configuration surface: service, stage,
//! region, optional API overrides, and per-function event declarations.
//! Field names follow the camelCase used in service manifests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level service manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceManifest {
    /// Service name, the first component of the default API name
    pub service: String,

    /// Provider settings
    #[serde(default)]
    pub provider: ProviderSettings,

    /// Declared functions keyed by name
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionDefinition>,
}

impl ServiceManifest {
    /// Whether any function declares at least one websocket route
    pub fn declares_websocket_routes(&self) -> bool {
        self.functions
            .values()
            .any(|function| function.websocket_routes().next().is_some())
    }
}

/// Provider-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    /// Deployment stage
    #[serde(default = "default_stage")]
    pub stage: String,

    /// Deployment region
    #[serde(default = "default_region")]
    pub region: String,

    /// Explicit API name, replacing the computed one
    #[serde(default)]
    pub websocket_api_name: Option<String>,

    /// Route selection expression for newly created APIs
    #[serde(default)]
    pub websocket_api_route_selection_expression: Option<String>,

    /// Route reconciliation strategy
    #[serde(default)]
    pub reconcile_strategy: ReconcileStrategyKind,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            stage: default_stage(),
            region: default_region(),
            websocket_api_name: None,
            websocket_api_route_selection_expression: None,
            reconcile_strategy: ReconcileStrategyKind::default(),
        }
    }
}

fn default_stage() -> String {
    "dev".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// How routes are reconciled against the remote API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconcileStrategyKind {
    /// Delete every route, then recreate the declared set
    #[default]
    FullResync,
}

/// A declared function
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    /// Handler reference, informational only
    #[serde(default)]
    pub handler: Option<String>,

    /// Declared events of every kind
    #[serde(default)]
    pub events: Vec<FunctionEvent>,
}

impl FunctionDefinition {
    /// Websocket routes with a non-empty route key
    pub fn websocket_routes(&self) -> impl Iterator<Item = &WebsocketRoute> {
        self.events.iter().filter_map(|event| match &event.websocket {
            Some(WebsocketEvent::Route(route)) if !route.route_key.trim().is_empty() => {
                Some(route)
            }
            _ => None,
        })
    }
}

/// One declared event; only the `websocket` shape is interpreted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub websocket: Option<WebsocketEvent>,

    /// Events of other kinds, kept opaque
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

/// A websocket event declaration
///
/// Declarations that are not route objects (e.g. a bare string) are kept
/// as `Other` and ignored during extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WebsocketEvent {
    Route(WebsocketRoute),
    Other(serde_json::Value),
}

/// A websocket route declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsocketRoute {
    pub route_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorizer: Option<AuthorizerDeclaration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_response_selection_expression: Option<String>,
}

/// Authorizer declaration on a route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerDeclaration {
    /// Explicit durable id of the authorizer function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    /// Name of a sibling function acting as authorizer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Identity sources, order-sensitive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_sources: Option<Vec<String>>,
}
