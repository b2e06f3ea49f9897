//! Reconcile strategy implementations

pub mod executor;
pub mod full_resync;

pub use executor::{ReconcileReport, ReconcileStrategy};
pub use full_resync::FullResyncStrategy;

use std::sync::Arc;
use tether_types::ReconcileStrategyKind;

/// Factory for creating reconcile strategies
pub fn create_strategy(kind: ReconcileStrategyKind) -> Arc<dyn ReconcileStrategy> {
    match kind {
        ReconcileStrategyKind::FullResync => Arc::new(FullResyncStrategy::new()),
    }
}
