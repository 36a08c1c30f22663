//! HTTP error mapping
//!
//! Every failure leaves the server as `{"error": "<message>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use relay::{DomainError, ProxyError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Domain(err) => domain_status(err),
            ApiError::Proxy(ProxyError::Internal(err)) => {
                tracing::error!(error = %err, "Execution failed outside the upstream call");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
            ApiError::Proxy(err) => (
                StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                err.to_string(),
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

fn domain_status(err: &DomainError) -> (StatusCode, String) {
    match err {
        DomainError::NotFound { entity_type, .. } => {
            (StatusCode::NOT_FOUND, format!("{} not found", entity_type))
        }
        DomainError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        DomainError::Repository(msg) | DomainError::ExternalService(msg) => {
            tracing::error!(error = %msg, "Internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_proxy_errors_keep_their_status() {
        let cases = [
            (ProxyError::InvalidIdentifier, 400, "Invalid API ID"),
            (ProxyError::NotFound, 404, "API not found"),
            (ProxyError::Inactive, 403, "API is not active"),
            (ProxyError::UpstreamTimeout, 408, "Request timeout"),
            (
                ProxyError::UpstreamFailure("connection refused".into()),
                500,
                "connection refused",
            ),
        ];
        for (err, status, message) in cases {
            let (got_status, got_message) = ApiError::from(err).status_and_message();
            assert_eq!(got_status.as_u16(), status);
            assert_eq!(got_message, message);
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ApiError::from(ProxyError::Internal(DomainError::Repository(
            "connection reset by peer".into(),
        )));
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal error");
    }

    #[test]
    fn test_domain_errors() {
        let (status, message) =
            ApiError::from(DomainError::not_found("API", Uuid::new_v4())).status_and_message();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "API not found");

        let (status, _) =
            ApiError::from(DomainError::Validation("bad".into())).status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
