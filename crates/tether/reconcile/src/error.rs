//! Reconciliation error types

use tether_gateway::{GatewayError, GatewayErrorKind};
use tether_types::DurableIdError;
use thiserror::Error;

/// Reconciliation errors
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A function declaring routes has no durable id in the stack outputs
    #[error("Function {function} is not deployed: stack output {output_key} not found")]
    FunctionNotDeployed { function: String, output_key: String },

    #[error("Invalid durable id for {subject}: {source}")]
    InvalidDurableId {
        subject: String,
        #[source]
        source: DurableIdError,
    },

    /// Provider failure, surfaced with its originating code
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ReconcileError {
    /// Classification of the failure, when it came from the provider
    pub fn gateway_kind(&self) -> Option<GatewayErrorKind> {
        match self {
            ReconcileError::Gateway(err) => Some(err.kind),
            _ => None,
        }
    }

    /// Whether the failure means something required is absent
    pub fn is_not_found(&self) -> bool {
        match self {
            ReconcileError::FunctionNotDeployed { .. } => true,
            ReconcileError::Gateway(err) => err.is_not_found(),
            ReconcileError::InvalidDurableId { .. } => false,
        }
    }
}

/// Result type for reconciliation operations
pub type Result<T> = std::result::Result<T, ReconcileError>;
