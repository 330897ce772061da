//! Immutable registry of upstream embed providers.
//!
//! The [`ProviderRegistry`] is built once at startup from configuration and
//! shared read-only across requests. Providers are looked up two ways:
//! case-insensitively by display name (query parameters), and exactly by the
//! lower-cased path segment used under `/proxy/`.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use super::template::{PathTemplate, BUILTIN_PROVIDERS};
use crate::config::ProviderConfig;

/// A single upstream embed host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provider {
    /// Display name, as configured (e.g. `"VidSrc"`).
    pub name: String,
    /// Lower-cased name, used as the `/proxy/{segment}` path component.
    pub segment: String,
    /// Upstream base URL without a trailing slash.
    pub base_url: String,
    /// Path shape for movie and TV URLs.
    pub template: PathTemplate,
}

impl Provider {
    pub fn new(name: &str, base_url: &str, template: PathTemplate) -> Self {
        Self {
            name: name.to_string(),
            segment: name.to_lowercase(),
            base_url: base_url.trim_end_matches('/').to_string(),
            template,
        }
    }

    /// Path prefix this provider is mounted at.
    pub fn mount_path(&self) -> String {
        format!("/proxy/{}", self.segment)
    }
}

/// Names become a literal route segment; anything the router treats as
/// syntax (`:`, `*`, `/`, braces) or that needs escaping is refused.
fn is_segment_safe(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Read-only collection of [`Provider`]s in registration order.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<Provider>>,
    /// Lower-cased name -> index into `providers`.
    index: HashMap<String, usize>,
}

impl ProviderRegistry {
    /// Build a registry from configured providers.
    ///
    /// Fails on empty or duplicate (case-insensitive) names, names that are
    /// not usable as a single path segment, base URLs that are not absolute
    /// http(s) URLs, and providers with no resolvable template.
    pub fn from_config(configs: &[ProviderConfig]) -> Result<Self> {
        let mut registry = Self::default();

        for cfg in configs {
            let name = cfg.name.trim();
            if name.is_empty() {
                anyhow::bail!("Provider name cannot be empty");
            }
            if !is_segment_safe(name) {
                anyhow::bail!(
                    "Provider name '{}' may only contain ASCII letters, digits, '-' and '_'",
                    name
                );
            }

            let parsed = url::Url::parse(&cfg.base_url).map_err(|e| {
                anyhow::anyhow!("Provider '{}' has invalid base_url '{}': {}", name, cfg.base_url, e)
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!(
                    "Provider '{}' base_url must be http or https, got '{}'",
                    name,
                    parsed.scheme()
                );
            }

            let template = cfg
                .template
                .or_else(|| PathTemplate::for_builtin(name))
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Provider '{}' has no path template; set `template` to one of \
                         standard, hyphenated, embed-nested",
                        name
                    )
                })?;

            registry.insert(Provider::new(name, &cfg.base_url, template))?;
        }

        Ok(registry)
    }

    /// Registry holding the built-in provider table.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for (name, base_url, template) in BUILTIN_PROVIDERS {
            let provider = Provider::new(name, base_url, *template);
            registry.index.insert(provider.segment.clone(), registry.providers.len());
            registry.providers.push(Arc::new(provider));
        }
        registry
    }

    fn insert(&mut self, provider: Provider) -> Result<()> {
        if self.index.contains_key(&provider.segment) {
            anyhow::bail!("Duplicate provider name: '{}'", provider.name);
        }
        self.index.insert(provider.segment.clone(), self.providers.len());
        self.providers.push(Arc::new(provider));
        Ok(())
    }

    /// Look up a provider by display name, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<&Arc<Provider>> {
        self.index
            .get(&name.to_lowercase())
            .map(|&idx| &self.providers[idx])
    }

    /// Look up a provider by its exact (already lower-cased) path segment.
    pub fn by_segment(&self, segment: &str) -> Option<&Arc<Provider>> {
        self.index.get(segment).map(|&idx| &self.providers[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Provider>> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(name: &str, base_url: &str, template: Option<PathTemplate>) -> ProviderConfig {
        ProviderConfig {
            name: name.to_string(),
            base_url: base_url.to_string(),
            template,
        }
    }

    #[test]
    fn builtin_registry_has_all_providers() {
        let registry = ProviderRegistry::builtin();
        assert_eq!(registry.len(), BUILTIN_PROVIDERS.len());
        let names: Vec<_> = registry.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"MoviesClub"));
        assert_eq!(names.last(), Some(&"VidSrcIn"));
    }

    #[test]
    fn lookup_ignores_case() {
        let registry = ProviderRegistry::builtin();
        let provider = registry.lookup("vIdSrC").unwrap();
        assert_eq!(provider.name, "VidSrc");
        assert_eq!(provider.segment, "vidsrc");
        assert!(registry.lookup("vidsrc3").is_none());
    }

    #[test]
    fn by_segment_is_exact() {
        let registry = ProviderRegistry::builtin();
        assert!(registry.by_segment("2embed").is_some());
        assert!(registry.by_segment("2Embed").is_none());
    }

    #[test]
    fn from_config_resolves_builtin_template() {
        let registry =
            ProviderRegistry::from_config(&[cfg("moviesclub", "http://mirror.local/", None)]).unwrap();
        let provider = registry.lookup("MoviesClub").unwrap();
        assert_eq!(provider.template, PathTemplate::Hyphenated);
        assert_eq!(provider.base_url, "http://mirror.local");
        assert_eq!(provider.mount_path(), "/proxy/moviesclub");
    }

    #[test]
    fn from_config_explicit_template_wins() {
        let registry = ProviderRegistry::from_config(&[cfg(
            "Autoembed",
            "https://player.autoembed.cc",
            Some(PathTemplate::Standard),
        )])
        .unwrap();
        assert_eq!(
            registry.lookup("autoembed").unwrap().template,
            PathTemplate::Standard
        );
    }

    #[test]
    fn from_config_rejects_unknown_template() {
        let err = ProviderRegistry::from_config(&[cfg("Mystery", "https://mystery.example", None)])
            .unwrap_err();
        assert!(err.to_string().contains("no path template"));
    }

    #[test]
    fn from_config_rejects_duplicates() {
        let err = ProviderRegistry::from_config(&[
            cfg("VidSrc", "https://a.example", None),
            cfg("VIDSRC", "https://b.example", None),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate provider"));
    }

    #[test]
    fn from_config_rejects_bad_urls() {
        assert!(ProviderRegistry::from_config(&[cfg("VidSrc", "not a url", None)]).is_err());
        assert!(ProviderRegistry::from_config(&[cfg("VidSrc", "ftp://host/embed", None)]).is_err());
        assert!(ProviderRegistry::from_config(&[cfg(" ", "https://a.example", None)]).is_err());
    }

    #[test]
    fn from_config_rejects_route_syntax_in_names() {
        for name in [":Mirror", "*Mirror", "Mir/ror", "{Mirror}", "Mir ror", "Mirrör"] {
            let err = ProviderRegistry::from_config(&[cfg(
                name,
                "https://mirror.example",
                Some(PathTemplate::Standard),
            )])
            .unwrap_err();
            assert!(err.to_string().contains("may only contain"), "{name}");
        }

        let registry = ProviderRegistry::from_config(&[cfg(
            "my_mirror-2",
            "https://mirror.example",
            Some(PathTemplate::Standard),
        )])
        .unwrap();
        assert_eq!(registry.lookup("MY_MIRROR-2").unwrap().mount_path(), "/proxy/my_mirror-2");
    }
}
