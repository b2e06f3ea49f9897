//! Read-only inspection of the deployed API

use crate::error::Result;
use crate::resolver::ApiResolver;
use tether_gateway::GatewayClient;
use tether_types::{ApiDescription, ApiSettings, DesiredState};
use tracing::{instrument, warn};

/// Describe the deployed API for a desired state
///
/// Reports nothing when no route is declared, or when the API has not been
/// deployed yet. Route keys come from the declarations, in order.
#[instrument(skip_all, fields(api_name = %settings.name))]
pub async fn describe(
    gateway: &dyn GatewayClient,
    settings: &ApiSettings,
    desired: &DesiredState,
) -> Result<Option<ApiDescription>> {
    if desired.is_empty() {
        return Ok(None);
    }

    let Some(api) = ApiResolver::new(gateway, settings).resolve().await? else {
        warn!("Websocket routes are declared but the API is not deployed");
        return Ok(None);
    };

    Ok(Some(ApiDescription {
        api_name: api.name.clone(),
        base_url: api.websocket_url(),
        api_id: api.api_id,
        route_keys: desired.route_keys().into_iter().map(String::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_gateway::InMemoryGateway;
    use tether_types::{DurableId, FunctionBinding, RouteSpec};

    fn settings() -> ApiSettings {
        ApiSettings {
            name: "svc-dev-websockets-api".into(),
            route_selection_expression: "$request.body.action".into(),
            region: "us-east-1".into(),
            stage: "dev".into(),
        }
    }

    fn desired() -> DesiredState {
        DesiredState::new(vec![FunctionBinding {
            name: "chat".into(),
            durable_id: DurableId::parse("arn:aws:lambda:us-east-1:1:function:chat:1").unwrap(),
            routes: vec![RouteSpec::new("$connect"), RouteSpec::new("sendMessage")],
        }])
    }

    #[tokio::test]
    async fn test_describe_formats_urls() {
        let gateway = InMemoryGateway::new();
        let settings = settings();
        let api = ApiResolver::new(&gateway, &settings)
            .resolve_or_create()
            .await
            .unwrap()
            .identity;

        let description = describe(&gateway, &settings, &desired()).await.unwrap().unwrap();
        let base = format!("wss://{}.execute-api.us-east-1.amazonaws.com/dev/", api.api_id);
        assert_eq!(
            description.lines(),
            vec![
                base.clone(),
                format!("{}$connect", base),
                format!("{}sendMessage", base),
            ]
        );
    }

    #[tokio::test]
    async fn test_describe_without_api_or_routes() {
        let gateway = InMemoryGateway::new();
        assert!(describe(&gateway, &settings(), &desired()).await.unwrap().is_none());
        assert!(describe(&gateway, &settings(), &DesiredState::default())
            .await
            .unwrap()
            .is_none());
        assert_eq!(gateway.calls().len(), 1);
    }
}
