//! Error types for the HTTP surface.
//!
//! Every request-level failure maps to a status code and a JSON body of the
//! form `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Request-level error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `server`, `type` or `id` was absent or empty.
    #[error("Missing required parameters")]
    MissingParameters,

    /// Unsupported media type, or a TV request without season/episode.
    #[error("Invalid parameters")]
    InvalidParameters,

    /// The provider name is not registered.
    #[error("Could not generate URL")]
    UrlNotGenerated,

    /// The upstream host could not be reached in time.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The upstream exchange failed after connecting.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameters | Self::InvalidParameters => StatusCode::BAD_REQUEST,
            Self::UrlNotGenerated => StatusCode::NOT_FOUND,
            Self::UpstreamUnavailable(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::UpstreamUnavailable(err.to_string())
        } else {
            Self::Upstream(err.to_string())
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// Result type alias using the request-level Error type.
pub type Result<T> = std::result::Result<T, Error>;
