//! Event types for reconciliation observability
//!
//! Events provide a unified stream of what a converge, destroy or describe
//! run did to the remote API.

use crate::ids::{ApiId, AuthorizerId, DeploymentId, IntegrationId, RouteId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping all events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TetherEventEnvelope {
    /// Unique event ID
    pub id: Uuid,

    /// Event timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Event severity
    pub severity: EventSeverity,

    /// Correlation ID shared by all events of one operation
    pub correlation_id: Option<String>,

    /// The actual event
    pub event: TetherEvent,
}

/// Event severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSeverity {
    Info,
    Warning,
    Error,
}

/// Reconciliation events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TetherEvent {
    /// Existing API found by name
    ApiResolved { api_id: ApiId, name: String },

    /// New API created
    ApiCreated { api_id: ApiId, name: String },

    /// Every existing route deleted
    RoutesCleared { api_id: ApiId, count: usize },

    /// Integration created for a function
    IntegrationCreated {
        function: String,
        integration_id: IntegrationId,
    },

    /// Route created
    RouteCreated { route_key: String, route_id: RouteId },

    /// A conflicting create was tolerated
    ConflictTolerated { operation: String, detail: String },

    /// Matching authorizer reused
    AuthorizerReused { authorizer_id: AuthorizerId },

    /// New authorizer created
    AuthorizerCreated {
        authorizer_id: AuthorizerId,
        name: String,
    },

    /// Deployment published to a stage
    DeploymentPublished {
        deployment_id: DeploymentId,
        stage: String,
        stage_created: bool,
    },

    /// Converge finished
    ConvergeCompleted { api_id: ApiId, duration_ms: u64 },

    /// Converge aborted
    ConvergeFailed { reason: String },

    /// API deleted
    ApiRemoved { api_id: ApiId },
}

impl TetherEventEnvelope {
    /// Create a new event envelope
    pub fn new(event: TetherEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            severity: Self::infer_severity(&event),
            correlation_id: None,
            event,
        }
    }

    /// Create with correlation ID
    pub fn with_correlation(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    fn infer_severity(event: &TetherEvent) -> EventSeverity {
        match event {
            TetherEvent::ConvergeFailed { .. } => EventSeverity::Error,
            TetherEvent::ConflictTolerated { .. } => EventSeverity::Warning,
            _ => EventSeverity::Info,
        }
    }
}
