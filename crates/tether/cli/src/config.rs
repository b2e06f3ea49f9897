//! Manifest loading
//!
//! The manifest file is read as YAML (JSON is accepted too). Provider
//! settings can then be overridden from `TETHER_PROVIDER__*` environment
//! variables, and finally by `--stage` / `--region`.

use crate::error::{CliError, CliResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tether_types::ServiceManifest;
use tracing::debug;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TETHER";

/// Overrides given on the command line
#[derive(Debug, Clone, Default)]
pub struct ManifestOverrides {
    pub stage: Option<String>,
    pub region: Option<String>,
}

/// Provider settings overridable from the environment
#[derive(Debug, Default, Deserialize)]
pub struct ProviderOverlay {
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub websocket_api_name: Option<String>,
    #[serde(default)]
    pub websocket_api_route_selection_expression: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ManifestOverlay {
    #[serde(default)]
    pub provider: ProviderOverlay,
}

impl ManifestOverlay {
    /// Load from `TETHER_`-prefixed variables, e.g. `TETHER_PROVIDER__STAGE`
    ///
    /// `env` replaces the process environment when given.
    pub fn load(env: Option<HashMap<String, String>>) -> CliResult<Self> {
        let overlay = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()?
            .try_deserialize()?;
        Ok(overlay)
    }

    fn apply(self, manifest: &mut ServiceManifest) {
        let provider = &mut manifest.provider;
        if let Some(stage) = self.provider.stage {
            provider.stage = stage;
        }
        if let Some(region) = self.provider.region {
            provider.region = region;
        }
        if let Some(name) = self.provider.websocket_api_name {
            provider.websocket_api_name = Some(name);
        }
        if let Some(expression) = self.provider.websocket_api_route_selection_expression {
            provider.websocket_api_route_selection_expression = Some(expression);
        }
    }
}

/// Read a manifest file and apply environment and command-line overrides
pub fn load_manifest(
    path: &Path,
    overrides: &ManifestOverrides,
    env: Option<HashMap<String, String>>,
) -> CliResult<ServiceManifest> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut manifest: ServiceManifest =
        serde_yaml::from_str(&raw).map_err(|source| CliError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;

    ManifestOverlay::load(env)?.apply(&mut manifest);

    if let Some(stage) = &overrides.stage {
        manifest.provider.stage = stage.clone();
    }
    if let Some(region) = &overrides.region {
        manifest.provider.region = region.clone();
    }

    debug!(
        service = %manifest.service,
        stage = %manifest.provider.stage,
        region = %manifest.provider.region,
        functions = manifest.functions.len(),
        "Loaded manifest"
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MANIFEST: &str = r#"
service: chat-app
provider:
  region: eu-west-1
functions:
  sendMessage:
    handler: handler.send
    events:
      - websocket:
          routeKey: sendMessage
"#;

    fn manifest_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(MANIFEST.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_and_file_values() {
        let file = manifest_file();
        let manifest =
            load_manifest(file.path(), &ManifestOverrides::default(), Some(HashMap::new())).unwrap();

        assert_eq!(manifest.service, "chat-app");
        assert_eq!(manifest.provider.stage, "dev");
        assert_eq!(manifest.provider.region, "eu-west-1");
        assert!(manifest.functions.contains_key("sendMessage"));
        assert!(manifest.declares_websocket_routes());
    }

    #[test]
    fn test_environment_then_flags_override() {
        let file = manifest_file();
        let env = HashMap::from([
            ("TETHER_PROVIDER__STAGE".to_string(), "staging".to_string()),
            ("TETHER_PROVIDER__REGION".to_string(), "us-west-2".to_string()),
            (
                "TETHER_PROVIDER__WEBSOCKET_API_NAME".to_string(),
                "realtime".to_string(),
            ),
        ]);
        let overrides = ManifestOverrides {
            stage: Some("prod".into()),
            region: None,
        };

        let manifest = load_manifest(file.path(), &overrides, Some(env)).unwrap();
        assert_eq!(manifest.provider.stage, "prod");
        assert_eq!(manifest.provider.region, "us-west-2");
        assert_eq!(manifest.provider.websocket_api_name.as_deref(), Some("realtime"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_manifest(
            Path::new("/nonexistent/tether.yml"),
            &ManifestOverrides::default(),
            Some(HashMap::new()),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }
}
