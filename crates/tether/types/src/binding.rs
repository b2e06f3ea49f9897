//! Desired-state model
//!
//! Bindings are rebuilt on every operation from the manifest plus the
//! deployment outputs, and discarded when the operation completes.

use crate::ids::DurableId;
use crate::naming::CONNECT_ROUTE_KEY;
use serde::{Deserialize, Serialize};

/// A deployed function and the routes it declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionBinding {
    pub name: String,
    pub durable_id: DurableId,
    pub routes: Vec<RouteSpec>,
}

impl FunctionBinding {
    pub fn has_routes(&self) -> bool {
        !self.routes.is_empty()
    }
}

/// One declared route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub route_key: String,
    pub authorizer: Option<AuthorizerSpec>,
    pub route_response_selection_expression: Option<String>,
}

impl RouteSpec {
    pub fn new(route_key: impl Into<String>) -> Self {
        Self {
            route_key: route_key.into(),
            authorizer: None,
            route_response_selection_expression: None,
        }
    }

    pub fn with_authorizer(mut self, authorizer: AuthorizerSpec) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    pub fn with_response_selection(mut self, expression: impl Into<String>) -> Self {
        self.route_response_selection_expression = Some(expression.into());
        self
    }

    /// Authorizer that applies to this route, if any
    ///
    /// Authorizers are only honored on the connect route.
    pub fn effective_authorizer(&self) -> Option<&AuthorizerSpec> {
        if self.route_key == CONNECT_ROUTE_KEY {
            self.authorizer.as_ref()
        } else {
            None
        }
    }
}

/// Where an authorizer's function comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizerTarget {
    /// Explicit durable id
    Arn(String),
    /// Sibling function resolved by name
    Function(String),
}

/// Declared request authorizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizerSpec {
    pub target: AuthorizerTarget,
    pub identity_sources: Vec<String>,
}

impl AuthorizerSpec {
    pub fn function(name: impl Into<String>, identity_sources: Vec<String>) -> Self {
        Self {
            target: AuthorizerTarget::Function(name.into()),
            identity_sources,
        }
    }

    pub fn arn(arn: impl Into<String>, identity_sources: Vec<String>) -> Self {
        Self {
            target: AuthorizerTarget::Arn(arn.into()),
            identity_sources,
        }
    }
}

/// Output of desired-state extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    /// Every function with a resolved durable id, routes possibly empty
    pub all_functions: Vec<FunctionBinding>,
    /// Functions declaring at least one route
    pub websocket_functions: Vec<FunctionBinding>,
}

impl DesiredState {
    pub fn new(all_functions: Vec<FunctionBinding>) -> Self {
        let websocket_functions = all_functions
            .iter()
            .filter(|f| f.has_routes())
            .cloned()
            .collect();
        Self {
            all_functions,
            websocket_functions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.websocket_functions.is_empty()
    }

    /// Durable id of a declared function, looked up by name
    pub fn durable_id_of(&self, name: &str) -> Option<&DurableId> {
        self.all_functions
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.durable_id)
    }

    /// Route keys across every websocket function, in declaration order
    pub fn route_keys(&self) -> Vec<&str> {
        self.websocket_functions
            .iter()
            .flat_map(|f| f.routes.iter().map(|r| r.route_key.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(name: &str, routes: Vec<RouteSpec>) -> FunctionBinding {
        FunctionBinding {
            name: name.to_string(),
            durable_id: DurableId::parse(format!("arn:aws:lambda:us-east-1:1:function:{}", name))
                .unwrap(),
            routes,
        }
    }

    #[test]
    fn test_desired_state_partitions_functions() {
        let state = DesiredState::new(vec![
            binding("chat", vec![RouteSpec::new("$connect"), RouteSpec::new("send")]),
            binding("auth", vec![]),
        ]);

        assert_eq!(state.all_functions.len(), 2);
        assert_eq!(state.websocket_functions.len(), 1);
        assert_eq!(state.route_keys(), vec!["$connect", "send"]);
        assert_eq!(
            state.durable_id_of("auth").map(|id| id.function_name()),
            Some("auth")
        );
        assert!(state.durable_id_of("missing").is_none());
    }

    #[test]
    fn test_authorizer_only_applies_to_connect() {
        let auth = AuthorizerSpec::function("auth", vec!["route.request.header.Token".into()]);
        let connect = RouteSpec::new("$connect").with_authorizer(auth.clone());
        let other = RouteSpec::new("send").with_authorizer(auth);

        assert!(connect.effective_authorizer().is_some());
        assert!(other.effective_authorizer().is_none());
    }
}
