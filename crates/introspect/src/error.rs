//! Error handling with RFC 7807 Problem Details for JSON responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

pub type Result<T> = std::result::Result<T, IntrospectError>;

/// Introspection endpoint errors.
#[derive(Debug, thiserror::Error)]
pub enum IntrospectError {
    #[error("profile window must be between {min} and {max} seconds, got {got}")]
    InvalidWindow { got: u64, min: u64, max: u64 },

    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    #[error("no route for {0}")]
    NotFound(String),

    #[error("failed to bind introspection endpoint on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("introspection server stopped: {0}")]
    Serve(#[source] std::io::Error),
}

impl IntrospectError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidWindow { .. } | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Bind { .. } | Self::Serve(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// RFC 7807 Problem Details for HTTP APIs
#[derive(Debug, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    pub title: String,
    pub status: u16,
    pub detail: String,
}

impl ProblemDetails {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            problem_type: None,
            title: status.canonical_reason().unwrap_or("Error").to_string(),
            status: status.as_u16(),
            detail: detail.into(),
        }
    }
}

impl IntoResponse for IntrospectError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::warn!(%status, error = %self, "introspection request failed");
        (status, Json(ProblemDetails::new(status, self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_window_is_a_bad_request() {
        let err = IntrospectError::InvalidWindow {
            got: 0,
            min: 1,
            max: 60,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("got 0"));
    }

    #[test]
    fn test_unknown_route_is_not_found() {
        let err = IntrospectError::NotFound("/nope".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "no route for /nope");
    }

    #[test]
    fn test_problem_details_title_from_status() {
        let problem = ProblemDetails::new(StatusCode::BAD_REQUEST, "nope");
        assert_eq!(problem.title, "Bad Request");
        assert_eq!(problem.status, 400);
    }
}
