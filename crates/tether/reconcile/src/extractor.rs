//! Desired-state extraction
//!
//! Turns the declared functions plus the stack outputs into bindings. A
//! function without routes stays in `all_functions` so authorizers can be
//! looked up by name, but is never reconciled.

use crate::error::{ReconcileError, Result};
use std::collections::HashMap;
use tether_gateway::{StackOutput, StackOutputSource};
use tether_types::{
    naming, AuthorizerDeclaration, AuthorizerSpec, AuthorizerTarget, DesiredState, DurableId,
    FunctionBinding, RouteSpec, ServiceManifest, WebsocketRoute,
};
use tracing::{debug, instrument, warn};

/// Fetch the stack outputs for a manifest and extract its desired state
#[instrument(skip_all, fields(service = %manifest.service, stage = %manifest.provider.stage))]
pub async fn load_desired_state(
    manifest: &ServiceManifest,
    outputs: &dyn StackOutputSource,
) -> Result<DesiredState> {
    let stack_name = naming::stack_name(&manifest.service, &manifest.provider.stage);
    let stack_outputs = outputs.describe_outputs(&stack_name).await?;
    extract_desired_state(manifest, &stack_outputs)
}

/// Extract the desired state from a manifest and already-fetched outputs
pub fn extract_desired_state(
    manifest: &ServiceManifest,
    outputs: &[StackOutput],
) -> Result<DesiredState> {
    let lookup: HashMap<&str, &str> = outputs
        .iter()
        .map(|o| (o.output_key.as_str(), o.output_value.as_str()))
        .collect();

    let mut all_functions = Vec::with_capacity(manifest.functions.len());

    for (name, definition) in &manifest.functions {
        let routes: Vec<RouteSpec> = definition
            .websocket_routes()
            .map(|route| route_spec(name, route))
            .collect();

        let output_key = naming::output_key_for(name);
        let raw = match lookup.get(output_key.as_str()) {
            Some(raw) => *raw,
            None if routes.is_empty() => {
                debug!(function = %name, output_key = %output_key, "No durable id for function without routes");
                continue;
            }
            None => {
                return Err(ReconcileError::FunctionNotDeployed {
                    function: name.clone(),
                    output_key,
                })
            }
        };

        let durable_id = match DurableId::parse(raw) {
            Ok(id) => id,
            Err(source) if routes.is_empty() => {
                warn!(function = %name, error = %source, "Ignoring unparsable durable id");
                continue;
            }
            Err(source) => {
                return Err(ReconcileError::InvalidDurableId {
                    subject: format!("function {}", name),
                    source,
                })
            }
        };

        all_functions.push(FunctionBinding {
            name: name.clone(),
            durable_id,
            routes,
        });
    }

    let desired = DesiredState::new(all_functions);
    debug!(
        functions = desired.all_functions.len(),
        websocket_functions = desired.websocket_functions.len(),
        "Extracted desired state"
    );
    Ok(desired)
}

fn route_spec(function: &str, route: &WebsocketRoute) -> RouteSpec {
    RouteSpec {
        route_key: route.route_key.clone(),
        authorizer: route
            .authorizer
            .as_ref()
            .and_then(|declaration| authorizer_spec(function, &route.route_key, declaration)),
        route_response_selection_expression: route
            .route_response_selection_expression
            .clone()
            .filter(|expr| !expr.is_empty()),
    }
}

fn authorizer_spec(
    function: &str,
    route_key: &str,
    declaration: &AuthorizerDeclaration,
) -> Option<AuthorizerSpec> {
    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

    // An explicit arn wins over a function name
    let target = match (non_empty(&declaration.arn), non_empty(&declaration.name)) {
        (Some(arn), _) => AuthorizerTarget::Arn(arn),
        (None, Some(name)) => AuthorizerTarget::Function(name),
        (None, None) => {
            warn!(function, route_key, "Authorizer declares neither arn nor name");
            return None;
        }
    };

    Some(AuthorizerSpec {
        target,
        identity_sources: declaration.identity_sources.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_types::{FunctionDefinition, FunctionEvent, WebsocketEvent};

    fn websocket(route_key: &str) -> FunctionEvent {
        FunctionEvent {
            websocket: Some(WebsocketEvent::Route(WebsocketRoute {
                route_key: route_key.to_string(),
                authorizer: None,
                route_response_selection_expression: None,
            })),
            ..Default::default()
        }
    }

    fn manifest(functions: Vec<(&str, Vec<FunctionEvent>)>) -> ServiceManifest {
        ServiceManifest {
            service: "svc".into(),
            functions: functions
                .into_iter()
                .map(|(name, events)| {
                    (
                        name.to_string(),
                        FunctionDefinition {
                            handler: None,
                            events,
                        },
                    )
                })
                .collect(),
            ..Default::default()
        }
    }

    fn output(name: &str) -> StackOutput {
        StackOutput::new(
            naming::output_key_for(name),
            format!("arn:aws:lambda:us-east-1:123456789012:function:{}:1", name),
        )
    }

    #[test]
    fn test_filters_functions_without_routes() {
        let manifest = manifest(vec![
            ("chat", vec![websocket("$connect"), websocket("sendMessage")]),
            ("notify", vec![]),
        ]);
        let desired = extract_desired_state(&manifest, &[output("chat"), output("notify")]).unwrap();

        assert_eq!(desired.all_functions.len(), 2);
        assert_eq!(desired.websocket_functions.len(), 1);
        assert_eq!(desired.websocket_functions[0].name, "chat");
        assert_eq!(desired.route_keys(), vec!["$connect", "sendMessage"]);
    }

    #[test]
    fn test_missing_output_for_websocket_function_fails() {
        let manifest = manifest(vec![("chat", vec![websocket("$connect")])]);
        let err = extract_desired_state(&manifest, &[]).unwrap_err();

        match err {
            ReconcileError::FunctionNotDeployed {
                function,
                output_key,
            } => {
                assert_eq!(function, "chat");
                assert_eq!(output_key, "ChatLambdaFunctionQualifiedArn");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_output_for_plain_function_is_skipped() {
        let manifest = manifest(vec![("chat", vec![websocket("$default")]), ("cron", vec![])]);
        let desired = extract_desired_state(&manifest, &[output("chat")]).unwrap();
        assert_eq!(desired.all_functions.len(), 1);
    }

    #[test]
    fn test_empty_route_key_is_ignored() {
        let manifest = manifest(vec![("chat", vec![websocket(""), websocket("  ")])]);
        let desired = extract_desired_state(&manifest, &[output("chat")]).unwrap();
        assert!(desired.is_empty());
    }

    #[test]
    fn test_authorizer_arn_wins_over_name() {
        let declaration = AuthorizerDeclaration {
            arn: Some("arn:aws:lambda:us-east-1:1:function:ext".into()),
            name: Some("auth".into()),
            identity_sources: Some(vec!["route.request.header.Token".into()]),
        };
        let spec = authorizer_spec("chat", "$connect", &declaration).unwrap();
        assert_eq!(
            spec.target,
            AuthorizerTarget::Arn("arn:aws:lambda:us-east-1:1:function:ext".into())
        );

        let by_name = AuthorizerDeclaration {
            arn: None,
            ..declaration
        };
        let spec = authorizer_spec("chat", "$connect", &by_name).unwrap();
        assert_eq!(spec.target, AuthorizerTarget::Function("auth".into()));

        assert!(authorizer_spec("chat", "$connect", &AuthorizerDeclaration::default()).is_none());
    }
}
