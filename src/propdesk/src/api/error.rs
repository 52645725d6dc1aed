use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] entity_core::Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::InvalidBody(_) | Self::NotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Store(entity_core::Error::InvalidCursor | entity_core::Error::Key(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_owned()
        } else {
            tracing::debug!(error = %self, "request rejected");
            self.to_string()
        };

        (status, Json(json!({ "response": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_bad_request() {
        assert_eq!(ApiError::MissingField("email").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Store(entity_core::Error::InvalidCursor).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn store_failures_are_internal() {
        let err = ApiError::from(entity_core::Error::persistence("PutItem", "throttled"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
