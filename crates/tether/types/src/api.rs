//! API identity and description

use crate::ids::ApiId;
use crate::manifest::ServiceManifest;
use crate::naming;
use serde::{Deserialize, Serialize};

/// Settings that scope every operation on the API
///
/// Computed once from the manifest before the API is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    pub name: String,
    pub route_selection_expression: String,
    pub region: String,
    pub stage: String,
}

impl ApiSettings {
    pub fn from_manifest(manifest: &ServiceManifest) -> Self {
        let provider = &manifest.provider;
        Self {
            name: naming::api_name(
                &manifest.service,
                &provider.stage,
                provider.websocket_api_name.as_deref(),
            ),
            route_selection_expression: naming::route_selection_expression(
                provider.websocket_api_route_selection_expression.as_deref(),
            ),
            region: provider.region.clone(),
            stage: provider.stage.clone(),
        }
    }
}

/// A resolved API, immutable for the duration of one operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiIdentity {
    pub api_id: ApiId,
    pub name: String,
    pub route_selection_expression: String,
    pub region: String,
    pub stage: String,
}

impl ApiIdentity {
    pub fn new(api_id: ApiId, settings: &ApiSettings) -> Self {
        Self {
            api_id,
            name: settings.name.clone(),
            route_selection_expression: settings.route_selection_expression.clone(),
            region: settings.region.clone(),
            stage: settings.stage.clone(),
        }
    }

    /// Public connection URL of the configured stage
    pub fn websocket_url(&self) -> String {
        naming::websocket_url(&self.api_id, &self.region, &self.stage)
    }
}

/// Read-only report of a deployed API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDescription {
    pub api_name: String,
    pub api_id: ApiId,
    pub base_url: String,
    pub route_keys: Vec<String>,
}

impl ApiDescription {
    /// Connection URL of every route
    pub fn route_urls(&self) -> Vec<String> {
        self.route_keys
            .iter()
            .map(|key| format!("{}{}", self.base_url, key))
            .collect()
    }

    /// Base URL followed by one line per route
    pub fn lines(&self) -> Vec<String> {
        std::iter::once(self.base_url.clone())
            .chain(self.route_urls())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ProviderSettings;

    #[test]
    fn test_settings_from_manifest() {
        let manifest = ServiceManifest {
            service: "chat".into(),
            provider: ProviderSettings {
                stage: "prod".into(),
                region: "eu-west-1".into(),
                ..Default::default()
            },
            ..Default::default()
        };

        let settings = ApiSettings::from_manifest(&manifest);
        assert_eq!(settings.name, "chat-prod-websockets-api");
        assert_eq!(settings.route_selection_expression, "$request.body.action");
        assert_eq!(settings.region, "eu-west-1");
        assert_eq!(settings.stage, "prod");
    }

    #[test]
    fn test_description_lines() {
        let identity = ApiIdentity::new(
            ApiId::new("abc123"),
            &ApiSettings {
                name: "chat-dev-websockets-api".into(),
                route_selection_expression: "$request.body.action".into(),
                region: "us-east-1".into(),
                stage: "dev".into(),
            },
        );
        let description = ApiDescription {
            api_name: identity.name.clone(),
            api_id: identity.api_id.clone(),
            base_url: identity.websocket_url(),
            route_keys: vec!["$connect".into(), "sendMessage".into()],
        };

        assert_eq!(
            description.lines(),
            vec![
                "wss://abc123.execute-api.us-east-1.amazonaws.com/dev/".to_string(),
                "wss://abc123.execute-api.us-east-1.amazonaws.com/dev/$connect".to_string(),
                "wss://abc123.execute-api.us-east-1.amazonaws.com/dev/sendMessage".to_string(),
            ]
        );
    }
}
