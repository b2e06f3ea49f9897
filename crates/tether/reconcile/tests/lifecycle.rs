//! Host hook output: deploy, remove and info

mod common;

use common::*;
use std::sync::Arc;
use tether_gateway::{GatewayOperation, InMemoryGateway};
use tether_reconcile::{LifecycleHooks, WebsocketsLifecycle};
use tether_types::TetherEvent;

fn lifecycle(
    gateway: &Arc<InMemoryGateway>,
    console: &Arc<RecordingConsole>,
) -> WebsocketsLifecycle {
    let manifest = manifest(vec![
        ("chat", vec![route("$connect"), route("sendMessage")]),
        ("notify", vec![]),
    ]);
    WebsocketsLifecycle::new(manager(gateway, manifest), console.clone())
}

#[tokio::test]
async fn deploy_then_info_then_remove() {
    let gateway = Arc::new(InMemoryGateway::new());
    let console = Arc::new(RecordingConsole::default());
    let hooks = lifecycle(&gateway, &console);

    hooks.on_post_deploy().await.unwrap();
    let api = gateway.api_by_name("chat-app-dev-websockets-api").unwrap();
    let id = api.summary.api_id.clone();
    let base = format!("wss://{}.execute-api.us-east-1.amazonaws.com/dev/", id);

    assert_eq!(
        console.lines(),
        vec![
            "Deploying Websockets API named \"chat-app-dev-websockets-api\"...".to_string(),
            format!(
                "Websockets API named \"chat-app-dev-websockets-api\" with ID \"{}\" has been deployed.",
                id
            ),
            format!("  Websocket URL: {}", base),
        ]
    );

    let console = Arc::new(RecordingConsole::default());
    let hooks = lifecycle(&gateway, &console);
    hooks.on_post_info().await.unwrap();
    assert_eq!(
        console.lines(),
        vec![
            "WebSockets:".to_string(),
            format!("  Base URL: {}", base),
            "  Routes:".to_string(),
            format!("    - {}$connect", base),
            format!("    - {}sendMessage", base),
        ]
    );

    let console = Arc::new(RecordingConsole::default());
    let hooks = lifecycle(&gateway, &console);
    let mut events = hooks.manager().subscribe();
    hooks.on_post_remove().await.unwrap();
    assert_eq!(
        console.lines(),
        vec![format!(
            "Removing Websockets API named \"chat-app-dev-websockets-api\" with ID \"{}\"",
            id
        )]
    );
    assert_eq!(gateway.api_count(), 0);
    assert!(matches!(
        events.try_recv().unwrap().event,
        TetherEvent::ApiRemoved { .. }
    ));
}

#[tokio::test]
async fn remove_without_api_is_silent() {
    let gateway = Arc::new(InMemoryGateway::new());
    let console = Arc::new(RecordingConsole::default());

    lifecycle(&gateway, &console).on_post_remove().await.unwrap();

    assert!(console.lines().is_empty());
    assert_eq!(gateway.call_count(GatewayOperation::DeleteApi), 0);
    assert_eq!(gateway.mutation_count(), 0);
}

#[tokio::test]
async fn info_before_deploy_prints_nothing() {
    let gateway = Arc::new(InMemoryGateway::new());
    let console = Arc::new(RecordingConsole::default());

    lifecycle(&gateway, &console).on_post_info().await.unwrap();

    assert!(console.lines().is_empty());
    assert_eq!(gateway.mutation_count(), 0);
}

#[tokio::test]
async fn hooks_ignore_services_without_websockets() {
    let gateway = Arc::new(InMemoryGateway::new());
    let console = Arc::new(RecordingConsole::default());
    let manifest = manifest(vec![("api", vec![http("/users")])]);
    let hooks = WebsocketsLifecycle::new(manager(&gateway, manifest), console.clone());

    hooks.on_post_deploy().await.unwrap();
    hooks.on_post_info().await.unwrap();

    assert!(console.lines().is_empty());
    assert!(gateway.calls().is_empty());
}
