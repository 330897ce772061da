//! Per-provider path templates and the URL generator.
//!
//! Providers disagree on how embed paths are shaped, so each provider is
//! bound to one [`PathTemplate`]. The template owns a pair of pure functions
//! (movie and TV) selected from a fixed dispatch table; adding a provider means
//! adding a table entry, not a new branch.

use serde::{Deserialize, Serialize};

use super::registry::ProviderRegistry;

/// Path shape used by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathTemplate {
    /// `{base}/movie/{id}` and `{base}/tv/{id}/{season}/{episode}`.
    Standard,
    /// `{base}/movie/{id}` and `{base}/tv/{id}-{season}-{episode}`.
    Hyphenated,
    /// `{base}/embed/movie/{id}` and `{base}/embed/tv/{id}/{season}/{episode}`.
    EmbedNested,
}

type MovieFn = fn(&str, &str) -> String;
type TvFn = fn(&str, &str, &str, &str) -> String;

struct TemplateFns {
    movie: MovieFn,
    tv: TvFn,
}

fn slash_movie(base: &str, id: &str) -> String {
    format!("{base}/movie/{id}")
}

fn slash_tv(base: &str, id: &str, season: &str, episode: &str) -> String {
    format!("{base}/tv/{id}/{season}/{episode}")
}

fn hyphen_tv(base: &str, id: &str, season: &str, episode: &str) -> String {
    format!("{base}/tv/{id}-{season}-{episode}")
}

fn embed_movie(base: &str, id: &str) -> String {
    format!("{base}/embed/movie/{id}")
}

fn embed_tv(base: &str, id: &str, season: &str, episode: &str) -> String {
    format!("{base}/embed/tv/{id}/{season}/{episode}")
}

const STANDARD: TemplateFns = TemplateFns {
    movie: slash_movie,
    tv: slash_tv,
};

const HYPHENATED: TemplateFns = TemplateFns {
    movie: slash_movie,
    tv: hyphen_tv,
};

const EMBED_NESTED: TemplateFns = TemplateFns {
    movie: embed_movie,
    tv: embed_tv,
};

/// Providers shipped in the default configuration.
pub const BUILTIN_PROVIDERS: &[(&str, &str, PathTemplate)] = &[
    ("MoviesClub", "https://moviesapi.club", PathTemplate::Hyphenated),
    ("VidSrc", "https://vidsrc.icu/embed", PathTemplate::Standard),
    ("VidSrc2", "https://vidsrc.vip/embed", PathTemplate::Standard),
    ("Turbovid", "https://turbovid.eu/api/req", PathTemplate::Standard),
    ("Embed", "https://embed.su/embed", PathTemplate::Standard),
    ("NontonGo", "https://www.NontonGo.win/embed", PathTemplate::Standard),
    ("Autoembed", "https://player.autoembed.cc", PathTemplate::EmbedNested),
    ("VidFast", "https://vidfast.pro", PathTemplate::Standard),
    ("2Embed", "https://www.2embed.stream/embed", PathTemplate::Standard),
    ("VidLink", "https://vidlink.pro", PathTemplate::Standard),
    ("VidSrcIn", "https://vidsrc.in/embed", PathTemplate::Standard),
];

impl PathTemplate {
    fn fns(self) -> &'static TemplateFns {
        match self {
            Self::Standard => &STANDARD,
            Self::Hyphenated => &HYPHENATED,
            Self::EmbedNested => &EMBED_NESTED,
        }
    }

    /// Template of a built-in provider, matched case-insensitively.
    pub fn for_builtin(name: &str) -> Option<Self> {
        BUILTIN_PROVIDERS
            .iter()
            .find(|(builtin, _, _)| builtin.eq_ignore_ascii_case(name))
            .map(|(_, _, template)| *template)
    }

    pub fn movie_path(self, base_url: &str, media_id: &str) -> String {
        (self.fns().movie)(base_url, media_id)
    }

    pub fn tv_path(self, base_url: &str, media_id: &str, season: &str, episode: &str) -> String {
        (self.fns().tv)(base_url, media_id, season, episode)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Hyphenated => "hyphenated",
            Self::EmbedNested => "embed-nested",
        }
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream URL for a movie, or `None` if the provider is not registered.
pub fn movie_url(registry: &ProviderRegistry, provider_name: &str, media_id: &str) -> Option<String> {
    let provider = registry.lookup(provider_name)?;
    Some(provider.template.movie_path(&provider.base_url, media_id))
}

/// Upstream URL for a TV episode, or `None` if the provider is not registered.
pub fn tv_url(
    registry: &ProviderRegistry,
    provider_name: &str,
    media_id: &str,
    season: &str,
    episode: &str,
) -> Option<String> {
    let provider = registry.lookup(provider_name)?;
    Some(
        provider
            .template
            .tv_path(&provider.base_url, media_id, season, episode),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin_registry() -> ProviderRegistry {
        ProviderRegistry::builtin()
    }

    #[test]
    fn test_standard_movie_url() {
        let registry = builtin_registry();
        assert_eq!(
            movie_url(&registry, "Turbovid", "tt123").as_deref(),
            Some("https://turbovid.eu/api/req/movie/tt123")
        );
        assert_eq!(
            movie_url(&registry, "VidSrc", "42").as_deref(),
            Some("https://vidsrc.icu/embed/movie/42")
        );
    }

    #[test]
    fn test_standard_tv_url() {
        let registry = builtin_registry();
        assert_eq!(
            tv_url(&registry, "VidLink", "1399", "1", "2").as_deref(),
            Some("https://vidlink.pro/tv/1399/1/2")
        );
    }

    #[test]
    fn test_hyphenated_tv_url() {
        let registry = builtin_registry();
        assert_eq!(
            tv_url(&registry, "MoviesClub", "1", "2", "3").as_deref(),
            Some("https://moviesapi.club/tv/1-2-3")
        );
        assert_eq!(
            movie_url(&registry, "MoviesClub", "550").as_deref(),
            Some("https://moviesapi.club/movie/550")
        );
    }

    #[test]
    fn test_embed_nested_urls() {
        let registry = builtin_registry();
        assert_eq!(
            movie_url(&registry, "Autoembed", "550").as_deref(),
            Some("https://player.autoembed.cc/embed/movie/550")
        );
        assert_eq!(
            tv_url(&registry, "Autoembed", "1399", "3", "9").as_deref(),
            Some("https://player.autoembed.cc/embed/tv/1399/3/9")
        );
    }

    #[test]
    fn test_every_builtin_contains_base_and_id() {
        let registry = builtin_registry();
        for (name, base, _) in BUILTIN_PROVIDERS {
            let movie = movie_url(&registry, name, "tt0111161").unwrap();
            assert!(movie.starts_with(base), "{movie} should start with {base}");
            assert!(movie.ends_with("/tt0111161"));

            let tv = tv_url(&registry, name, "1399", "4", "7").unwrap();
            assert!(tv.starts_with(base), "{tv} should start with {base}");
            assert!(tv.contains("1399"));
        }
    }

    #[test]
    fn test_unknown_provider_yields_none() {
        let registry = builtin_registry();
        assert_eq!(movie_url(&registry, "NoSuchHost", "1"), None);
        assert_eq!(tv_url(&registry, "NoSuchHost", "1", "1", "1"), None);
        assert_eq!(movie_url(&registry, "", "1"), None);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = builtin_registry();
        assert_eq!(
            movie_url(&registry, "vidsrc", "7"),
            movie_url(&registry, "VIDSRC", "7")
        );
        assert!(movie_url(&registry, "vidsrc", "7").is_some());
    }

    #[test]
    fn test_for_builtin() {
        assert_eq!(
            PathTemplate::for_builtin("autoembed"),
            Some(PathTemplate::EmbedNested)
        );
        assert_eq!(
            PathTemplate::for_builtin("MoviesClub"),
            Some(PathTemplate::Hyphenated)
        );
        assert_eq!(PathTemplate::for_builtin("unknown"), None);
    }

    #[test]
    fn test_template_serde_names() {
        let parsed: PathTemplate = serde_json::from_str("\"embed-nested\"").unwrap();
        assert_eq!(parsed, PathTemplate::EmbedNested);
        assert_eq!(
            serde_json::to_string(&PathTemplate::Hyphenated).unwrap(),
            "\"hyphenated\""
        );
        assert_eq!(PathTemplate::Standard.to_string(), "standard");
    }
}
