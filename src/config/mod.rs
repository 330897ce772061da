mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

use crate::providers::ProviderRegistry;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    parse_config(&content).with_context(|| format!("Invalid config file: {:?}", path))
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./embedproxy.toml",
        "~/.config/embedproxy/config.toml",
        "/etc/embedproxy/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if let Some(public_url) = &config.server.public_url {
        url::Url::parse(public_url)
            .with_context(|| format!("Invalid server.public_url: {}", public_url))?;
    }

    if config.providers.is_empty() {
        anyhow::bail!("No providers configured");
    }

    // Names, URLs and templates are checked by the registry itself
    ProviderRegistry::from_config(&config.providers)?;

    Ok(())
}
