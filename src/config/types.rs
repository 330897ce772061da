use serde::{Deserialize, Serialize};

use crate::providers::{PathTemplate, BUILTIN_PROVIDERS};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream providers. Omitting the table selects the built-in list.
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            providers: default_providers(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Absolute origin prepended to generated internal paths
    /// (e.g. `http://localhost:3000`). Bare paths are returned when unset.
    #[serde(default)]
    pub public_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub name: String,

    pub base_url: String,

    /// Path template; may be omitted for built-in provider names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathTemplate>,
}

fn default_providers() -> Vec<ProviderConfig> {
    BUILTIN_PROVIDERS
        .iter()
        .map(|(name, base_url, template)| ProviderConfig {
            name: name.to_string(),
            base_url: base_url.to_string(),
            template: Some(*template),
        })
        .collect()
}
