//! Authorizer deduplication
//!
//! Creating an authorizer is not idempotent on the provider side, so an
//! existing authorizer with the same invocation target and the same
//! identity sources (order-sensitive) is reused instead.

use crate::error::Result;
use crate::permissions::{grant_invoke_permission, PermissionOutcome};
use tether_gateway::{AuthorizerType, CreateAuthorizerRequest, GatewayClient};
use tether_types::{naming, ApiIdentity, AuthorizerId, DurableId};
use tokio::sync::Mutex;
use tracing::{info, instrument};

/// Outcome of ensuring an authorizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizerOutcome {
    pub authorizer_id: AuthorizerId,
    pub name: Option<String>,
    pub created: bool,
}

/// Finds or creates request authorizers on one API
///
/// The list-then-create sequence is serialized so concurrent route
/// branches within one operation cannot create duplicates.
pub struct AuthorizerDeduplicator {
    critical_section: Mutex<()>,
}

impl AuthorizerDeduplicator {
    pub fn new() -> Self {
        Self {
            critical_section: Mutex::new(()),
        }
    }

    /// Reuse or create the authorizer backed by `durable_id`
    #[instrument(skip(self, gateway, api), fields(api_id = %api.api_id, function = %durable_id.function_name()))]
    pub async fn ensure(
        &self,
        gateway: &dyn GatewayClient,
        api: &ApiIdentity,
        durable_id: &DurableId,
        identity_sources: &[String],
    ) -> Result<AuthorizerOutcome> {
        let _guard = self.critical_section.lock().await;

        let existing = gateway.list_authorizers(&api.api_id).await?;
        let authorizer_uri = naming::invocation_uri(&api.region, durable_id);

        if let Some(found) = existing.iter().find(|a| {
            a.authorizer_uri == authorizer_uri && a.identity_source.as_slice() == identity_sources
        }) {
            info!(authorizer_id = %found.authorizer_id, "Reusing matching authorizer");
            return Ok(AuthorizerOutcome {
                authorizer_id: found.authorizer_id.clone(),
                name: Some(found.name.clone()),
                created: false,
            });
        }

        let name = naming::authorizer_name(existing.len());
        let created = gateway
            .create_authorizer(CreateAuthorizerRequest {
                api_id: api.api_id.clone(),
                name: name.clone(),
                authorizer_type: AuthorizerType::Request,
                authorizer_uri,
                identity_source: identity_sources.to_vec(),
            })
            .await?;

        let resource = naming::authorizer_resource(&created.authorizer_id);
        if grant_invoke_permission(gateway, &api.api_id, durable_id, &resource).await?
            == PermissionOutcome::AlreadyGranted
        {
            info!(authorizer_id = %created.authorizer_id, "Authorizer function already invokable");
        }

        info!(authorizer_id = %created.authorizer_id, name = %name, "Created authorizer");

        Ok(AuthorizerOutcome {
            authorizer_id: created.authorizer_id,
            name: Some(name),
            created: true,
        })
    }
}

impl Default for AuthorizerDeduplicator {
    fn default() -> Self {
        Self::new()
    }
}
