//! Reconcile strategy trait and result

use crate::context::ReconcileContext;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What a strategy did to the API's routes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Name of the strategy that produced this report
    pub strategy: String,
    pub routes_cleared: usize,
    pub integrations_created: usize,
    pub routes_created: usize,
    /// Creates that collided with an existing object and were swallowed
    pub conflicts_tolerated: usize,
    pub authorizers_created: usize,
    pub authorizers_reused: usize,
}

impl ReconcileReport {
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            ..Default::default()
        }
    }

    /// Fold another partial report into this one
    pub fn absorb(&mut self, other: &ReconcileReport) {
        self.routes_cleared += other.routes_cleared;
        self.integrations_created += other.integrations_created;
        self.routes_created += other.routes_created;
        self.conflicts_tolerated += other.conflicts_tolerated;
        self.authorizers_created += other.authorizers_created;
        self.authorizers_reused += other.authorizers_reused;
    }
}

/// Trait for route reconcile strategies
#[async_trait]
pub trait ReconcileStrategy: Send + Sync {
    /// Bring the API's routes in line with the context's desired state
    ///
    /// The API must already exist. Publishing is not part of a strategy.
    async fn reconcile(&self, ctx: &ReconcileContext) -> Result<ReconcileReport>;

    /// Strategy name for logging
    fn name(&self) -> &str;
}
