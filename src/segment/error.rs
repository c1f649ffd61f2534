//! Segment API error types
//!
//! Every failure the HTTP layer can produce, classified so callers can tell
//! a missing resource apart from a broken request.

use thiserror::Error;

use super::catalog::CatalogKind;

/// Result alias for Segment API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by the Segment API client
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base URL given to the client could not be parsed.
    #[error("invalid API base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The underlying HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Network, DNS, TLS or timeout failure.
    #[error("{method} url: {url}: {source}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered 404.
    #[error("{method} url: {url}, status: 404, body: {body}: resource not found")]
    NotFound {
        method: String,
        url: String,
        body: String,
    },

    /// The API answered with any other status than 200 or 201.
    #[error("{method} url: {url}, status: {status}, body: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// The response body was not the JSON shape we expected.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response decoded but lacked something we rely on.
    #[error("unexpected response from {url}: {message}")]
    UnexpectedResponse { url: String, message: String },

    /// Catalog walked to the end without an entry for the slug.
    #[error("did not find {kind} '{slug}' in the catalog")]
    SlugNotFound { kind: CatalogKind, slug: String },

    /// Roles walked to the end without a role of that name.
    #[error("did not find role '{name}'")]
    RoleNotFound { name: String },
}

impl ApiError {
    /// True when the remote resource does not exist (HTTP 404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// HTTP status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
