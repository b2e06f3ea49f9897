//! Tether Reconcile Engine
//!
//! Converges a WebSocket API onto the functions that declare routes.
//!
//! ## Pipeline
//!
//! - `extractor` builds the desired state from the manifest and the stack
//!   outputs.
//! - `resolver` finds or creates the API by its deterministic name.
//! - A [`ReconcileStrategy`] rewrites the routes. `full-resync` clears every
//!   route, then rebuilds integrations, permissions, authorizers and routes
//!   concurrently per function.
//! - `publisher` snapshots the API and points the stage at it.
//! - `teardown` and `inspector` cover remove and info.
//!
//! ## Errors
//!
//! Provider failures arrive classified. `Conflict` is swallowed for route
//! creation and permission grants, `NotFound` falls back to creation for
//! stages, and anything else aborts the whole operation. Re-running is the
//! recovery path, since every converge starts by clearing routes.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use tether_gateway::{InMemoryGateway, InMemoryStackOutputs};
//! use tether_reconcile::{TracingConsole, WebsocketApiManager, WebsocketsLifecycle, LifecycleHooks};
//! use tether_types::ServiceManifest;
//!
//! # async fn example(manifest: ServiceManifest) -> Result<(), Box<dyn std::error::Error>> {
//! let manager = WebsocketApiManager::new(
//!     Arc::new(InMemoryGateway::new()),
//!     Arc::new(InMemoryStackOutputs::new()),
//!     manifest,
//! );
//! let lifecycle = WebsocketsLifecycle::new(manager, Arc::new(TracingConsole));
//! lifecycle.on_post_deploy().await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod authorizer;
pub mod context;
pub mod error;
pub mod events;
pub mod extractor;
pub mod inspector;
pub mod lifecycle;
pub mod manager;
pub mod permissions;
pub mod publisher;
pub mod resolver;
pub mod strategies;
pub mod teardown;

// Re-exports
pub use authorizer::{AuthorizerDeduplicator, AuthorizerOutcome};
pub use context::{ReconcileContext, RouteOutcome};
pub use error::{ReconcileError, Result};
pub use events::EventSink;
pub use extractor::{extract_desired_state, load_desired_state};
pub use lifecycle::{Console, LifecycleHooks, TracingConsole, WebsocketsLifecycle};
pub use manager::{ConvergeReport, WebsocketApiManager};
pub use permissions::PermissionOutcome;
pub use publisher::{DeploymentPublisher, PublishOutcome};
pub use resolver::{ApiResolver, ResolvedApi};
pub use strategies::{create_strategy, FullResyncStrategy, ReconcileReport, ReconcileStrategy};
