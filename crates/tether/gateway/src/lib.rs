//! Tether Gateway - control-plane access to the WebSocket API provider
//!
//! The reconciliation engine never talks to the provider directly. It calls
//! through [`GatewayClient`], and every failure arrives as a
//! [`GatewayError`] already classified into a closed [`GatewayErrorKind`],
//! so callers match on `NotFound`/`Conflict` instead of provider strings.
//!
//! ## In-Memory vs Remote
//!
//! [`InMemoryGateway`] reproduces the provider semantics the engine relies
//! on (route-key conflicts, permission statement conflicts, cascading API
//! deletion, missing stages) and records every call. It backs the test
//! suites and the CLI's snapshot-file mode. Remote providers implement the
//! same trait.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod client;
pub mod error;
pub mod memory;
pub mod outputs;

// Re-exports
pub use client::{
    AddPermissionRequest, ApiSummary, AuthorizationType, AuthorizerSummary, AuthorizerType,
    CreateApiRequest, CreateAuthorizerRequest, CreateIntegrationRequest,
    CreateRouteRequest, CreateRouteResponseRequest, GatewayClient, GatewayOperation,
    IntegrationSummary, IntegrationType, ProtocolType, RouteResponseSummary, RouteSummary,
    StageRequest,
};
pub use error::{GatewayError, GatewayErrorKind, Result};
pub use memory::{ApiRecord, GatewaySnapshot, InMemoryGateway, PermissionGrant, RecordedCall};
pub use outputs::{InMemoryStackOutputs, StackOutput, StackOutputSource};
