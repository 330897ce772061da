//! Reverse-proxy routes, one per provider.
//!
//! Each provider is mounted at `/proxy/{segment}`. Requests are forwarded to
//! the provider's base URL with that prefix stripped and the `host` header
//! dropped, so the upstream sees itself as the direct target. Request bodies
//! stream upstream. HTML responses are buffered and sanitized; everything else
//! streams through untouched.

use std::sync::Arc;

use axum::{
    body::{Body, HttpBody},
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::any,
    Router,
};

use crate::error::{Error, Result};
use crate::providers::{Provider, ProviderRegistry};
use crate::sanitize::sanitize_bytes;

/// Headers that only apply to a single connection and are never forwarded.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Per-route state: the provider a route forwards to and the shared client.
#[derive(Clone)]
pub struct ProxyTarget {
    pub provider: Arc<Provider>,
    pub client: reqwest::Client,
}

/// Build the shared upstream client.
///
/// Redirects are passed back to the caller instead of being followed.
pub fn build_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))
}

/// Mount the proxy routes for every registered provider.
///
/// `*rest` never matches an empty remainder, so the bare mount and its
/// trailing-slash form are registered separately.
pub fn proxy_routes<S>(registry: &ProviderRegistry, client: &reqwest::Client) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    registry.iter().fold(Router::new(), |router, provider| {
        let target = ProxyTarget {
            provider: Arc::clone(provider),
            client: client.clone(),
        };
        let mount = provider.mount_path();
        tracing::debug!("Mounting {} -> {}", mount, provider.base_url);

        router
            .route(&mount, any(forward).with_state(target.clone()))
            .route(&format!("{mount}/"), any(forward).with_state(target.clone()))
            .route(&format!("{mount}/*rest"), any(forward).with_state(target))
    })
}

/// Strip the `/proxy/{segment}` prefix, anchored at the start of `path`.
///
/// Matching is case-sensitive on the lower-cased segment. Paths that do not
/// start with the prefix are returned unchanged; an empty remainder becomes `/`.
pub fn strip_prefix(path: &str, segment: &str) -> String {
    let prefix = format!("/proxy/{segment}");
    match path.strip_prefix(&prefix) {
        Some("") => "/".to_string(),
        Some(rest) => rest.to_string(),
        None => path.to_string(),
    }
}

/// Full upstream URL for an incoming request.
pub fn upstream_url(provider: &Provider, path: &str, query: Option<&str>) -> String {
    let stripped = strip_prefix(path, &provider.segment);
    match query {
        Some(q) if !q.is_empty() => format!("{}{}?{}", provider.base_url, stripped, q),
        _ => format!("{}{}", provider.base_url, stripped),
    }
}

fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/html"))
}

fn forwardable_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = headers.clone();
    for name in HOP_BY_HOP {
        out.remove(name);
    }
    // Host is re-derived from the upstream URL; encodings are left to the
    // transport so buffered HTML arrives as plain text
    out.remove(header::HOST);
    out.remove(header::ACCEPT_ENCODING);
    out
}

async fn forward(State(target): State<ProxyTarget>, request: Request) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let url = upstream_url(&target.provider, parts.uri.path(), parts.uri.query());

    tracing::debug!("Proxying {} {} -> {}", parts.method, parts.uri.path(), url);

    let mut builder = target
        .client
        .request(parts.method.clone(), &url)
        .headers(forwardable_request_headers(&parts.headers));
    if body.size_hint().exact() != Some(0) {
        builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    let upstream = builder
        .send()
        .await
        .map_err(|e| {
            tracing::warn!("Upstream request to {} failed: {}", url, e);
            Error::from(e)
        })?;

    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    for name in HOP_BY_HOP {
        headers.remove(name);
    }

    if is_html(&headers) {
        let html = upstream.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read HTML body from {}: {}", url, e);
            Error::from(e)
        })?;
        let sanitized = sanitize_bytes(&html);

        headers.remove(header::CONTENT_ENCODING);
        headers.insert(header::CONTENT_LENGTH, sanitized.len().into());

        return build_response(status, headers, Body::from(sanitized));
    }

    build_response(status, headers, Body::from_stream(upstream.bytes_stream()))
}

fn build_response(status: StatusCode, headers: HeaderMap, body: Body) -> Result<Response> {
    let mut response = Response::builder()
        .status(status)
        .body(body)
        .map_err(|e| Error::internal(format!("Failed to build response: {e}")))?;
    *response.headers_mut() = headers;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::PathTemplate;

    fn provider(name: &str, base_url: &str) -> Provider {
        Provider::new(name, base_url, PathTemplate::Standard)
    }

    #[test]
    fn strips_anchored_prefix() {
        assert_eq!(strip_prefix("/proxy/vidsrc/movie/42", "vidsrc"), "/movie/42");
        assert_eq!(strip_prefix("/proxy/vidsrc", "vidsrc"), "/");
        assert_eq!(strip_prefix("/proxy/vidsrc/", "vidsrc"), "/");
    }

    #[test]
    fn strip_is_case_sensitive_and_anchored() {
        assert_eq!(strip_prefix("/proxy/VidSrc/movie/42", "vidsrc"), "/proxy/VidSrc/movie/42");
        assert_eq!(
            strip_prefix("/x/proxy/vidsrc/movie/42", "vidsrc"),
            "/x/proxy/vidsrc/movie/42"
        );
    }

    #[test]
    fn strip_only_removes_first_occurrence() {
        assert_eq!(
            strip_prefix("/proxy/vidsrc/proxy/vidsrc/a", "vidsrc"),
            "/proxy/vidsrc/a"
        );
    }

    #[test]
    fn upstream_url_joins_base_path_and_query() {
        let p = provider("VidSrc", "https://vidsrc.icu/embed");
        assert_eq!(
            upstream_url(&p, "/proxy/vidsrc/movie/42", None),
            "https://vidsrc.icu/embed/movie/42"
        );
        assert_eq!(
            upstream_url(&p, "/proxy/vidsrc/tv/1/2/3", Some("autoplay=1")),
            "https://vidsrc.icu/embed/tv/1/2/3?autoplay=1"
        );
        assert_eq!(
            upstream_url(&p, "/proxy/vidsrc/movie/42", Some("")),
            "https://vidsrc.icu/embed/movie/42"
        );
    }

    #[test]
    fn html_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_html(&headers));
        headers.insert(header::CONTENT_TYPE, "text/html; charset=utf-8".parse().unwrap());
        assert!(is_html(&headers));
        headers.insert(header::CONTENT_TYPE, "video/mp4".parse().unwrap());
        assert!(!is_html(&headers));
    }

    #[test]
    fn request_headers_drop_host_and_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "localhost:3000".parse().unwrap());
        headers.insert(header::CONNECTION, "keep-alive".parse().unwrap());
        headers.insert(header::ACCEPT_ENCODING, "gzip".parse().unwrap());
        headers.insert(header::USER_AGENT, "test-agent".parse().unwrap());
        headers.insert(header::RANGE, "bytes=0-99".parse().unwrap());
        headers.insert(header::CONTENT_LENGTH, "11".parse().unwrap());

        let out = forwardable_request_headers(&headers);
        assert!(out.get(header::HOST).is_none());
        assert!(out.get(header::CONNECTION).is_none());
        assert!(out.get(header::ACCEPT_ENCODING).is_none());
        assert_eq!(out.get(header::USER_AGENT).unwrap(), "test-agent");
        assert_eq!(out.get(header::RANGE).unwrap(), "bytes=0-99");
        assert_eq!(out.get(header::CONTENT_LENGTH).unwrap(), "11");
    }
}
