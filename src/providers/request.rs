//! Validated media requests and the internal path scheme.

use std::fmt;

use serde::Serialize;

use super::registry::ProviderRegistry;
use super::template::{movie_url, tv_url};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Season and episode of a TV request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub season: String,
    pub episode: String,
}

/// A request for a single movie or TV episode from one provider.
///
/// Construction through [`MediaRequest::from_params`] guarantees that
/// `episode` is present iff `media_type` is [`MediaType::Tv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    pub provider_name: String,
    pub media_type: MediaType,
    pub media_id: String,
    pub episode: Option<Episode>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl MediaRequest {
    /// Validate raw request parameters.
    ///
    /// Absent or empty `server`, `type` or `id` is [`Error::MissingParameters`].
    /// A type other than `movie`/`tv`, or `tv` without both `season` and
    /// `episode`, is [`Error::InvalidParameters`].
    pub fn from_params(
        server: Option<&str>,
        media_type: Option<&str>,
        id: Option<&str>,
        season: Option<&str>,
        episode: Option<&str>,
    ) -> Result<Self> {
        let (Some(server), Some(media_type), Some(id)) =
            (present(server), present(media_type), present(id))
        else {
            return Err(Error::MissingParameters);
        };

        let (media_type, episode) = match (media_type, present(season), present(episode)) {
            ("movie", _, _) => (MediaType::Movie, None),
            ("tv", Some(season), Some(episode)) => (
                MediaType::Tv,
                Some(Episode {
                    season: season.to_string(),
                    episode: episode.to_string(),
                }),
            ),
            _ => return Err(Error::InvalidParameters),
        };

        Ok(Self {
            provider_name: server.to_string(),
            media_type,
            media_id: id.to_string(),
            episode,
        })
    }

    /// Upstream URL for this request, or `None` if the provider is unknown.
    pub fn upstream_url(&self, registry: &ProviderRegistry) -> Option<String> {
        match &self.episode {
            None => movie_url(registry, &self.provider_name, &self.media_id),
            Some(ep) => tv_url(
                registry,
                &self.provider_name,
                &self.media_id,
                &ep.season,
                &ep.episode,
            ),
        }
    }

    /// Client-facing path under this server's `/proxy/` namespace.
    pub fn internal_path(&self) -> String {
        let mut path = format!(
            "/proxy/{}/{}/{}",
            self.provider_name.to_lowercase(),
            self.media_type,
            self.media_id
        );
        if let Some(ep) = &self.episode {
            path.push('/');
            path.push_str(&ep.season);
            path.push('/');
            path.push_str(&ep.episode);
        }
        path
    }
}
