//! Error type for qBittorrent Web API operations.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Result alias used across the qBittorrent crates.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error type for qBittorrent Web API operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request failed at the transport level or the daemon answered with a non-success
    /// status.
    #[error("API request failed: {method} {endpoint}{detail}")]
    RequestFailed {
        /// HTTP method of the failed request.
        method: String,
        /// Endpoint path relative to the API root, e.g. `torrents/info`.
        endpoint: String,
        /// Best-effort diagnostic detail taken from the response.
        detail: ErrorDetail,
    },

    /// An operation that needs a session was called before logging in.
    #[error("not authenticated, please log in first")]
    AuthenticationRequired,

    /// The base URL could not be turned into an API root.
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// The underlying HTTP client could not be created.
    #[error("failed to initialise HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    /// Shorthand for building a [`ApiError::RequestFailed`].
    pub fn request_failed(
        method: impl Into<String>,
        endpoint: impl Into<String>,
        detail: ErrorDetail,
    ) -> Self {
        Self::RequestFailed {
            method: method.into(),
            endpoint: endpoint.into(),
            detail,
        }
    }
}

/// Diagnostic payload attached to a failed request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ErrorDetail {
    /// The response body decoded as JSON.
    Json(Value),
    /// The raw response text, or the transport error message.
    Text(String),
    /// Nothing useful was returned.
    #[default]
    None,
}

impl ErrorDetail {
    /// Builds the detail from a response body: JSON when it parses, raw text when it is
    /// non-empty, nothing otherwise.
    pub fn from_body(body: &str) -> Self {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            return Self::Json(value);
        }
        let trimmed = body.trim();
        if trimmed.is_empty() {
            Self::None
        } else {
            Self::Text(trimmed.to_string())
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, " - Details: {value}"),
            Self::Text(text) => write!(f, " - Response: {text}"),
            Self::None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn detail_prefers_json() {
        let detail = ErrorDetail::from_body(r#"{"error":"bad hash"}"#);
        assert_eq!(detail, ErrorDetail::Json(json!({"error": "bad hash"})));
    }

    #[test]
    fn detail_falls_back_to_text() {
        assert_eq!(
            ErrorDetail::from_body("Forbidden\n"),
            ErrorDetail::Text("Forbidden".to_string())
        );
        assert_eq!(ErrorDetail::from_body("   "), ErrorDetail::None);
    }

    #[test]
    fn request_failed_display() {
        let err = ApiError::request_failed(
            "GET",
            "torrents/info",
            ErrorDetail::Text("Forbidden".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "API request failed: GET torrents/info - Response: Forbidden"
        );

        let err = ApiError::request_failed("POST", "auth/logout", ErrorDetail::None);
        assert_eq!(err.to_string(), "API request failed: POST auth/logout");
    }
}
