//! Tether Types - Core types for WebSocket API reconciliation
//!
//! Tether converges a managed real-time messaging API (a WebSocket-style
//! API Gateway) onto the set of compute functions that declare message
//! routes. This crate holds the vocabulary shared by the gateway client,
//! the reconciliation engine and the CLI.
//!
//! ## Key Concepts
//!
//! - **FunctionBinding**: a deployed function, its durable id and its routes
//! - **RouteSpec**: one declared route key, with optional authorizer
//! - **ApiIdentity**: the resolved API plus the settings that scope a run
//! - **ServiceManifest**: the declared service configuration surface
//! - **Events**: the observability stream of a reconciliation run

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod api;
pub mod binding;
pub mod events;
pub mod ids;
pub mod manifest;
pub mod naming;

// Re-export main types
pub use api::{ApiDescription, ApiIdentity, ApiSettings};
pub use binding::{AuthorizerSpec, AuthorizerTarget, DesiredState, FunctionBinding, RouteSpec};
pub use events::{EventSeverity, TetherEvent, TetherEventEnvelope};
pub use ids::{
    ApiId, AuthorizerId, DeploymentId, DurableId, DurableIdError, IntegrationId, RouteId,
};
pub use manifest::{
    AuthorizerDeclaration, FunctionDefinition, FunctionEvent, ProviderSettings,
    ReconcileStrategyKind, ServiceManifest, WebsocketEvent, WebsocketRoute,
};
