//! Shared fixtures for the reconcile integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tether_gateway::{InMemoryGateway, InMemoryStackOutputs, StackOutput};
use tether_reconcile::{Console, WebsocketApiManager};
use tether_types::{
    AuthorizerDeclaration, FunctionDefinition, FunctionEvent, ServiceManifest, WebsocketEvent,
    WebsocketRoute,
};

pub const SERVICE: &str = "chat-app";
pub const ACCOUNT: &str = "123456789012";

pub fn durable_id(function: &str) -> String {
    format!("arn:aws:lambda:us-east-1:{}:function:{}-{}:7", ACCOUNT, SERVICE, function)
}

pub fn route(route_key: &str) -> FunctionEvent {
    FunctionEvent {
        websocket: Some(WebsocketEvent::Route(WebsocketRoute {
            route_key: route_key.to_string(),
            authorizer: None,
            route_response_selection_expression: None,
        })),
        ..Default::default()
    }
}

pub fn route_with_response(route_key: &str, expression: &str) -> FunctionEvent {
    FunctionEvent {
        websocket: Some(WebsocketEvent::Route(WebsocketRoute {
            route_key: route_key.to_string(),
            authorizer: None,
            route_response_selection_expression: Some(expression.to_string()),
        })),
        ..Default::default()
    }
}

pub fn connect_with_authorizer(authorizer: &str, identity_sources: &[&str]) -> FunctionEvent {
    FunctionEvent {
        websocket: Some(WebsocketEvent::Route(WebsocketRoute {
            route_key: "$connect".to_string(),
            authorizer: Some(AuthorizerDeclaration {
                arn: None,
                name: Some(authorizer.to_string()),
                identity_sources: Some(identity_sources.iter().map(|s| s.to_string()).collect()),
            }),
            route_response_selection_expression: None,
        })),
        ..Default::default()
    }
}

pub fn http(path: &str) -> FunctionEvent {
    let mut other = BTreeMap::new();
    other.insert(
        "http".to_string(),
        serde_json::json!({ "path": path, "method": "get" }),
    );
    FunctionEvent {
        websocket: None,
        other,
    }
}

pub fn manifest(functions: Vec<(&str, Vec<FunctionEvent>)>) -> ServiceManifest {
    let mut manifest = ServiceManifest {
        service: SERVICE.to_string(),
        ..Default::default()
    };
    for (name, events) in functions {
        manifest.functions.insert(
            name.to_string(),
            FunctionDefinition {
                handler: Some(format!("handler.{}", name)),
                events,
            },
        );
    }
    manifest
}

/// Outputs holding a durable id for every declared function
pub fn outputs_for(manifest: &ServiceManifest) -> InMemoryStackOutputs {
    let stack = format!("{}-{}", manifest.service, manifest.provider.stage);
    let outputs = InMemoryStackOutputs::new();
    outputs.insert(
        &stack,
        StackOutput::new("ServiceEndpointWebsocket", "unused"),
    );
    for name in manifest.functions.keys() {
        outputs.insert_function(&stack, name, &durable_id(name));
    }
    outputs
}

pub fn manager(gateway: &Arc<InMemoryGateway>, manifest: ServiceManifest) -> WebsocketApiManager {
    let outputs = outputs_for(&manifest);
    WebsocketApiManager::new(gateway.clone(), Arc::new(outputs), manifest)
}

/// Sorted (route key, target) pairs of the only API
pub fn route_table(gateway: &InMemoryGateway) -> Vec<(String, Option<String>)> {
    let snapshot = gateway.snapshot();
    let mut routes: Vec<(String, Option<String>)> = snapshot
        .apis
        .iter()
        .flat_map(|api| api.routes.values())
        .map(|route| (route.route_key.clone(), route.target.clone()))
        .collect();
    routes.sort();
    routes
}

/// Console capturing every line
#[derive(Default)]
pub struct RecordingConsole {
    lines: Mutex<Vec<String>>,
}

impl RecordingConsole {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Console for RecordingConsole {
    fn log(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }

    fn print(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}
