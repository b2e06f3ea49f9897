//! Full-resync reconcile strategy

use super::executor::{ReconcileReport, ReconcileStrategy};
use crate::context::{ReconcileContext, RouteOutcome};
use crate::error::Result;
use crate::permissions::PermissionOutcome;
use async_trait::async_trait;
use futures::future::try_join_all;
use tether_types::{naming, FunctionBinding, IntegrationId, RouteSpec};
use tracing::{info, instrument, warn};

/// Full-resync reconcile strategy
///
/// Deletes every route on the API, then rebuilds the complete desired
/// route set. Remote routes are never diffed against the desired ones, so
/// connections see a short gap while routes are recreated.
///
/// The clear phase completes before the rebuild phase starts. Rebuild fans
/// out one branch per function and, inside it, one branch per route; the
/// first failing branch fails the whole run.
pub struct FullResyncStrategy;

impl FullResyncStrategy {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, ctx, binding), fields(function = %binding.name))]
    async fn rebuild_function(
        &self,
        ctx: &ReconcileContext,
        binding: &FunctionBinding,
    ) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::new(self.name());

        let integration_id = ctx.create_integration(binding).await?;
        report.integrations_created += 1;

        if ctx
            .grant_invoke_permission(&binding.durable_id, naming::WILDCARD_RESOURCE)
            .await?
            == PermissionOutcome::AlreadyGranted
        {
            report.conflicts_tolerated += 1;
        }

        let routes = try_join_all(
            binding
                .routes
                .iter()
                .map(|route| self.rebuild_route(ctx, &integration_id, route)),
        )
        .await?;

        for route in &routes {
            report.absorb(route);
        }
        Ok(report)
    }

    async fn rebuild_route(
        &self,
        ctx: &ReconcileContext,
        integration_id: &IntegrationId,
        route: &RouteSpec,
    ) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::new(self.name());

        let authorizer = ctx.resolve_route_authorizer(route).await?;
        if let Some(outcome) = &authorizer {
            if outcome.created {
                report.authorizers_created += 1;
            } else {
                report.authorizers_reused += 1;
            }
        }

        let outcome = ctx
            .create_route(
                integration_id,
                route,
                authorizer.as_ref().map(|a| &a.authorizer_id),
            )
            .await?;

        match outcome {
            RouteOutcome::Created(created) => {
                report.routes_created += 1;
                if route.route_response_selection_expression.is_some() {
                    ctx.create_default_route_response(&created.route_id).await?;
                }
            }
            RouteOutcome::Conflict => {
                report.conflicts_tolerated += 1;
                if route.route_response_selection_expression.is_some() {
                    warn!(route_key = %route.route_key, "Route response skipped for conflicting route");
                }
            }
        }

        Ok(report)
    }
}

impl Default for FullResyncStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReconcileStrategy for FullResyncStrategy {
    async fn reconcile(&self, ctx: &ReconcileContext) -> Result<ReconcileReport> {
        let functions = &ctx.desired().websocket_functions;

        info!(
            api_id = %ctx.api().api_id,
            functions = functions.len(),
            "Starting full-resync"
        );

        // Phase 1: clear
        let mut report = ReconcileReport::new(self.name());
        report.routes_cleared = ctx.clear_routes().await?;

        // Phase 2: rebuild
        let branches = try_join_all(
            functions
                .iter()
                .map(|binding| self.rebuild_function(ctx, binding)),
        )
        .await?;

        for branch in &branches {
            report.absorb(branch);
        }

        info!(
            api_id = %ctx.api().api_id,
            routes_cleared = report.routes_cleared,
            routes_created = report.routes_created,
            conflicts = report.conflicts_tolerated,
            "Full-resync completed"
        );

        Ok(report)
    }

    fn name(&self) -> &str {
        "full-resync"
    }
}
