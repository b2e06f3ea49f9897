//! Gateway error types
//!
//! Provider error codes are classified once, here. Nothing downstream
//! inspects a code string to make a control-flow decision.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider codes meaning "the object does not exist"
pub const NOT_FOUND_CODES: &[&str] = &["NotFoundException", "ResourceNotFoundException"];

/// Provider codes meaning "an equivalent object already exists"
pub const CONFLICT_CODES: &[&str] = &["ConflictException", "ResourceConflictException"];

/// Closed classification of provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatewayErrorKind {
    /// Expected object is absent
    NotFound,
    /// Create collided with an existing object
    Conflict,
    /// Any other provider failure
    Provider,
}

impl GatewayErrorKind {
    /// Classify a provider error code
    pub fn classify(code: &str) -> Self {
        if NOT_FOUND_CODES.contains(&code) {
            GatewayErrorKind::NotFound
        } else if CONFLICT_CODES.contains(&code) {
            GatewayErrorKind::Conflict
        } else {
            GatewayErrorKind::Provider
        }
    }
}

/// Error returned by every gateway operation
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    /// Originating provider code
    pub code: String,
    pub message: String,
}

impl GatewayError {
    /// Build from a raw provider code, classifying it
    pub fn from_provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            kind: GatewayErrorKind::classify(&code),
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::from_provider("NotFoundException", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::from_provider("ConflictException", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::from_provider("BadRequestException", message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == GatewayErrorKind::NotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == GatewayErrorKind::Conflict
    }
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
