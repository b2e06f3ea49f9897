//! Strongly-typed identifiers for gateway objects
//!
//! Provider-assigned identifiers are opaque strings wrapped in newtypes so
//! a route id can never be passed where an integration id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Identifier of the top-level WebSocket API
    ApiId
);
opaque_id!(
    /// Identifier of an integration (route target)
    IntegrationId
);
opaque_id!(
    /// Identifier of a route
    RouteId
);
opaque_id!(
    /// Identifier of a request authorizer
    AuthorizerId
);
opaque_id!(
    /// Identifier of a deployment snapshot
    DeploymentId
);

impl IntegrationId {
    /// Route target string referencing this integration
    pub fn route_target(&self) -> String {
        format!("integrations/{}", self.0)
    }
}

/// Errors raised when a durable identifier cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurableIdError {
    #[error("durable id is empty")]
    Empty,

    #[error("durable id {0:?} does not have the form arn:<partition>:lambda:<region>:<account>:function:<name>")]
    Malformed(String),
}

/// Stable reference to a deployed function (a qualified function ARN)
///
/// Resolved from deployment metadata, never declared directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DurableId {
    raw: String,
}

impl DurableId {
    const REGION_FIELD: usize = 3;
    const ACCOUNT_FIELD: usize = 4;
    const NAME_FIELD: usize = 6;

    pub fn parse(raw: impl Into<String>) -> Result<Self, DurableIdError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DurableIdError::Empty);
        }

        let fields: Vec<&str> = raw.split(':').collect();
        if fields.len() <= Self::NAME_FIELD
            || fields[0] != "arn"
            || fields[Self::REGION_FIELD].is_empty()
            || fields[Self::ACCOUNT_FIELD].is_empty()
            || fields[Self::NAME_FIELD].is_empty()
        {
            return Err(DurableIdError::Malformed(raw));
        }

        Ok(Self { raw })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Region the function is deployed in
    pub fn region(&self) -> &str {
        self.field(Self::REGION_FIELD)
    }

    /// Account that owns the function
    pub fn account_id(&self) -> &str {
        self.field(Self::ACCOUNT_FIELD)
    }

    /// Bare function name, without qualifier
    pub fn function_name(&self) -> &str {
        self.field(Self::NAME_FIELD)
    }

    fn field(&self, index: usize) -> &str {
        // parse() guarantees the field exists
        self.raw.split(':').nth(index).unwrap_or_default()
    }
}

impl TryFrom<String> for DurableId {
    type Error = DurableIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DurableId> for String {
    fn from(id: DurableId) -> Self {
        id.raw
    }
}

impl fmt::Display for DurableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durable_id_fields() {
        let id = DurableId::parse("arn:aws:lambda:eu-west-1:123456789012:function:chat:7").unwrap();
        assert_eq!(id.region(), "eu-west-1");
        assert_eq!(id.account_id(), "123456789012");
        assert_eq!(id.function_name(), "chat");
    }

    #[test]
    fn test_durable_id_without_qualifier() {
        let id = DurableId::parse("arn:aws:lambda:us-east-1:1:function:auth").unwrap();
        assert_eq!(id.function_name(), "auth");
    }

    #[test]
    fn test_durable_id_rejects_short_arn() {
        assert_eq!(DurableId::parse(""), Err(DurableIdError::Empty));
        assert!(matches!(
            DurableId::parse("arn:aws:lambda:us-east-1:1"),
            Err(DurableIdError::Malformed(_))
        ));
        assert!(matches!(
            DurableId::parse("chat"),
            Err(DurableIdError::Malformed(_))
        ));
    }

    #[test]
    fn test_integration_route_target() {
        assert_eq!(IntegrationId::new("abc123").route_target(), "integrations/abc123");
    }

    #[test]
    fn test_durable_id_serde_validates() {
        let ok: DurableId =
            serde_json::from_str("\"arn:aws:lambda:us-east-1:1:function:chat\"").unwrap();
        assert_eq!(ok.function_name(), "chat");
        assert!(serde_json::from_str::<DurableId>("\"nope\"").is_err());
    }
}
