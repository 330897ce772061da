use crate::error::{Error, Result};
use crate::providers::{MediaRequest, Provider, ProviderRegistry};
use crate::server::AppContext;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health))
        .route("/video-url", get(video_url))
        .route("/providers", get(list_providers))
}

async fn health(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": ctx.registry.len(),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoUrlQuery {
    pub server: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub id: Option<String>,
    pub season: Option<String>,
    pub episode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VideoUrlResponse {
    pub url: String,
}

/// Resolve request parameters to the internal path clients should load.
///
/// Validation failures never reach the URL generator. An unknown provider is
/// [`Error::UrlNotGenerated`].
pub fn resolve(
    registry: &ProviderRegistry,
    public_url: Option<&str>,
    params: &VideoUrlQuery,
) -> Result<String> {
    let request = MediaRequest::from_params(
        params.server.as_deref(),
        params.media_type.as_deref(),
        params.id.as_deref(),
        params.season.as_deref(),
        params.episode.as_deref(),
    )?;

    let upstream = request
        .upstream_url(registry)
        .ok_or(Error::UrlNotGenerated)?;

    let path = request.internal_path();
    tracing::debug!("Resolved {} -> {} (upstream {})", request.provider_name, path, upstream);

    Ok(match public_url {
        Some(origin) => format!("{}{}", origin.trim_end_matches('/'), path),
        None => path,
    })
}

async fn video_url(
    State(ctx): State<AppContext>,
    Query(params): Query<VideoUrlQuery>,
) -> Result<Json<VideoUrlResponse>> {
    let url = resolve(
        &ctx.registry,
        ctx.config.server.public_url.as_deref(),
        &params,
    )?;
    Ok(Json(VideoUrlResponse { url }))
}

async fn list_providers(State(ctx): State<AppContext>) -> Json<Vec<Provider>> {
    Json(ctx.registry.iter().map(|p| p.as_ref().clone()).collect())
}
