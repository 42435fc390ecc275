//! Server error types

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use lontod_core::StoreError;
use thiserror::Error;

/// Errors that can occur while serving ontologies
#[derive(Debug, Error)]
pub enum ServerError {
    /// Nothing is stored under the requested identifier or type
    #[error("{0}")]
    NotFound(String),

    /// None of the stored types satisfy the `Accept` header
    #[error("no available content type")]
    NotAcceptable,

    /// Reading the index failed
    #[error("index store error: {0}")]
    Store(#[from] StoreError),

    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            ServerError::Store(_) | ServerError::Bind { .. } | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<lontod_core::NotAcceptable> for ServerError {
    fn from(_: lontod_core::NotAcceptable) -> Self {
        ServerError::NotAcceptable
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServerError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ServerError::NotAcceptable.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(
            ServerError::Store(StoreError::Poisoned).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let response = ServerError::Internal("secret path".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
