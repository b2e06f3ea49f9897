//! Host lifecycle entry points
//!
//! A deployment tool calls these after its own deploy, remove and info
//! operations complete. Progress goes to a [`Console`] supplied by the host.

use crate::error::Result;
use crate::manager::WebsocketApiManager;
use async_trait::async_trait;
use std::sync::Arc;
use tether_types::ApiDescription;
use tracing::info;

/// Output sink of the host tool
pub trait Console: Send + Sync {
    /// Progress message
    fn log(&self, message: &str);

    /// Raw output line
    fn print(&self, line: &str);

    /// Render the websocket section of the info output
    fn print_websockets(&self, description: &ApiDescription) {
        self.print("WebSockets:");
        self.print(&format!("  Base URL: {}", description.base_url));
        self.print("  Routes:");
        for url in description.route_urls() {
            self.print(&format!("    - {}", url));
        }
    }
}

/// Console that writes through `tracing`
pub struct TracingConsole;

impl Console for TracingConsole {
    fn log(&self, message: &str) {
        info!(target: "tether::console", "{}", message);
    }

    fn print(&self, line: &str) {
        info!(target: "tether::console", "{}", line);
    }
}

/// Zero-argument hooks invoked by the host
#[async_trait]
pub trait LifecycleHooks: Send + Sync {
    async fn on_post_deploy(&self) -> Result<()>;

    async fn on_post_remove(&self) -> Result<()>;

    async fn on_post_info(&self) -> Result<()>;
}

/// Lifecycle hooks backed by a [`WebsocketApiManager`]
pub struct WebsocketsLifecycle {
    manager: WebsocketApiManager,
    console: Arc<dyn Console>,
}

impl WebsocketsLifecycle {
    pub fn new(manager: WebsocketApiManager, console: Arc<dyn Console>) -> Self {
        Self { manager, console }
    }

    pub fn manager(&self) -> &WebsocketApiManager {
        &self.manager
    }
}

#[async_trait]
impl LifecycleHooks for WebsocketsLifecycle {
    async fn on_post_deploy(&self) -> Result<()> {
        if !self.manager.manifest().declares_websocket_routes() {
            return Ok(());
        }
        let desired = self.manager.desired_state().await?;
        if desired.is_empty() {
            return Ok(());
        }

        let api_name = &self.manager.settings().name;
        self.console
            .log(&format!("Deploying Websockets API named \"{}\"...", api_name));

        if let Some(report) = self.manager.converge_desired(desired).await? {
            self.console.log(&format!(
                "Websockets API named \"{}\" with ID \"{}\" has been deployed.",
                report.api_name, report.api_id
            ));
            self.console
                .log(&format!("  Websocket URL: {}", report.websocket_url));
        }
        Ok(())
    }

    async fn on_post_remove(&self) -> Result<()> {
        let Some(api) = self.manager.resolve_api().await? else {
            return Ok(());
        };

        self.console.log(&format!(
            "Removing Websockets API named \"{}\" with ID \"{}\"",
            api.name, api.api_id
        ));
        self.manager.delete_api(&api).await
    }

    async fn on_post_info(&self) -> Result<()> {
        if let Some(description) = self.manager.describe().await? {
            self.console.print_websockets(&description);
        }
        Ok(())
    }
}
