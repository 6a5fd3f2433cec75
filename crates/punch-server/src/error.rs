use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use punch_core::ClockError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("clock error: {0}")]
    Clock(#[from] ClockError),

    #[error("store error: {0}")]
    Store(#[from] punch_store::StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Clock(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller. Server-side detail stays in the log.
    fn public_message(&self) -> String {
        match self {
            Self::InvalidInput(_) | Self::Clock(ClockError::InvalidInput(_)) => {
                "Invalid input: uid and action are required.".into()
            }
            Self::Clock(ClockError::UnknownTag(_)) => "Unknown tag".into(),
            _ => "Internal Server Error".into(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use punch_store::StoreError;

    #[test]
    fn client_errors_are_400() {
        assert_eq!(
            ServerError::InvalidInput("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::from(ClockError::UnknownTag("ZZZZ".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn persistence_is_500() {
        let err = ServerError::from(ClockError::Persistence(StoreError::Unavailable(
            "down".into(),
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal Server Error");
    }
}
