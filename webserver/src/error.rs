//! WebServer-specific error types

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use designer::DesignerError;
use shared::SharedError;

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("Invalid request format: {details}")]
    InvalidRequest { details: String },

    #[error(transparent)]
    Designer(#[from] DesignerError),

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("Server startup error: {0}")]
    ServerStartup(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type WebServerResult<T> = Result<T, WebServerError>;

impl From<JsonRejection> for WebServerError {
    fn from(rejection: JsonRejection) -> Self {
        WebServerError::InvalidRequest { details: rejection.body_text() }
    }
}

impl From<PathRejection> for WebServerError {
    fn from(rejection: PathRejection) -> Self {
        WebServerError::InvalidRequest { details: rejection.body_text() }
    }
}

impl WebServerError {
    pub fn session_not_found(session_id: impl ToString) -> Self {
        WebServerError::SessionNotFound { session_id: session_id.to_string() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WebServerError::SessionNotFound { .. } => StatusCode::NOT_FOUND,
            WebServerError::InvalidRequest { .. } | WebServerError::SharedError(_) => StatusCode::BAD_REQUEST,
            WebServerError::Designer(e) => match e {
                DesignerError::OutOfRange { .. } | DesignerError::NoResult => StatusCode::NOT_FOUND,
                DesignerError::InvalidRoom { .. } | DesignerError::IncompleteForm { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                DesignerError::Generation { .. } | DesignerError::Search { .. } if e.is_timeout() => {
                    StatusCode::GATEWAY_TIMEOUT
                }
                DesignerError::Generation { .. } | DesignerError::Search { .. } => StatusCode::BAD_GATEWAY,
                DesignerError::Superseded => StatusCode::CONFLICT,
                DesignerError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            WebServerError::ServerStartup(_) | WebServerError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable name for the error body
    pub fn kind(&self) -> &'static str {
        match self {
            WebServerError::SessionNotFound { .. } => "session_not_found",
            WebServerError::InvalidRequest { .. } | WebServerError::SharedError(_) => "invalid_request",
            WebServerError::Designer(e) => match e {
                DesignerError::OutOfRange { .. } => "out_of_range",
                DesignerError::InvalidRoom { .. } => "invalid_room",
                DesignerError::IncompleteForm { .. } => "incomplete_form",
                DesignerError::Generation { .. } => "generation_failed",
                DesignerError::Search { .. } => "search_failed",
                DesignerError::Configuration { .. } => "configuration",
                DesignerError::Superseded => "superseded",
                DesignerError::NoResult => "no_result",
            },
            WebServerError::ServerStartup(_) | WebServerError::IoError(_) => "internal",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, WebServerError::Designer(e) if e.is_retryable())
    }
}

impl IntoResponse for WebServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(kind = self.kind(), error = %self, "Request failed");
        }

        let mut error = json!({
            "kind": self.kind(),
            "message": self.to_string(),
            "retryable": self.is_retryable(),
        });
        if let WebServerError::Designer(DesignerError::IncompleteForm { missing }) = &self {
            error["missing_fields"] = json!(missing);
        }

        (status, Json(json!({ "status": "error", "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ApiFailure;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (WebServerError::session_not_found("abc"), StatusCode::NOT_FOUND),
            (WebServerError::InvalidRequest { details: "bad body".into() }, StatusCode::BAD_REQUEST),
            (DesignerError::OutOfRange { index: 3, len: 1 }.into(), StatusCode::NOT_FOUND),
            (DesignerError::NoResult.into(), StatusCode::NOT_FOUND),
            (DesignerError::InvalidRoom { reason: "negative size".into() }.into(), StatusCode::UNPROCESSABLE_ENTITY),
            (DesignerError::IncompleteForm { missing: vec!["style".into()] }.into(), StatusCode::UNPROCESSABLE_ENTITY),
            (DesignerError::Generation { reason: ApiFailure::RateLimitExceeded }.into(), StatusCode::BAD_GATEWAY),
            (DesignerError::Search { reason: ApiFailure::Timeout }.into(), StatusCode::GATEWAY_TIMEOUT),
            (DesignerError::Superseded.into(), StatusCode::CONFLICT),
            (DesignerError::config("missing key").into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{error}");
        }
    }

    #[test]
    fn test_only_collaborator_failures_are_retryable() {
        let generation: WebServerError = DesignerError::Generation { reason: ApiFailure::ServiceUnavailable }.into();
        let superseded: WebServerError = DesignerError::Superseded.into();

        assert!(generation.is_retryable());
        assert!(!superseded.is_retryable());
        assert!(!WebServerError::session_not_found("x").is_retryable());
    }
}
