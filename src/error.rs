// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failures of the reconciliation core. Every variant is terminal for the
/// operation that produced it; nothing is retried internally.
#[derive(Debug, Error)]
pub enum UnboundError {
    /// Transport error, non-success status, or an operation `result` that
    /// did not match the expected literal.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// A response body did not have the expected shape.
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// Caller supplied incomplete desired state.
    #[error("missing input: {0}")]
    MissingInput(String),
}

impl UnboundError {
    pub fn request_failed(msg: impl Into<String>) -> Self {
        UnboundError::RequestFailed(msg.into())
    }

    pub fn decode_failed(msg: impl Into<String>) -> Self {
        UnboundError::DecodeFailed(msg.into())
    }

    pub fn missing_input(msg: impl Into<String>) -> Self {
        UnboundError::MissingInput(msg.into())
    }

    /// Prefix the message with the record the failure belongs to, keeping the kind.
    pub fn for_record(self, dns_name: &str) -> Self {
        match self {
            UnboundError::RequestFailed(msg) => {
                UnboundError::RequestFailed(format!("{dns_name:?}: {msg}"))
            }
            UnboundError::DecodeFailed(msg) => {
                UnboundError::DecodeFailed(format!("{dns_name:?}: {msg}"))
            }
            UnboundError::MissingInput(msg) => {
                UnboundError::MissingInput(format!("{dns_name:?}: {msg}"))
            }
        }
    }

    pub fn is_request_failed(&self) -> bool {
        matches!(self, UnboundError::RequestFailed(_))
    }

    pub fn is_decode_failed(&self) -> bool {
        matches!(self, UnboundError::DecodeFailed(_))
    }

    pub fn is_missing_input(&self) -> bool {
        matches!(self, UnboundError::MissingInput(_))
    }
}

impl From<reqwest::Error> for UnboundError {
    fn from(err: reqwest::Error) -> Self {
        UnboundError::RequestFailed(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponseBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Provider(#[from] UnboundError),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Provider(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        let body = Json(ErrorResponseBody { error: msg });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_record_keeps_kind_and_names_record() {
        let err = UnboundError::request_failed("status 500").for_record("foo.example.com");
        assert!(err.is_request_failed());
        assert_eq!(
            err.to_string(),
            "request failed: \"foo.example.com\": status 500"
        );

        let err = UnboundError::decode_failed("bad body").for_record("x");
        assert!(err.is_decode_failed());
        assert!(!err.is_request_failed());
    }

    #[test]
    fn provider_errors_map_to_500() {
        let resp = AppError::from(UnboundError::request_failed("boom")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = AppError::bad_request("nope").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
