//! HTTP error replies: one status + `{success: false, message}` body.
//!
//! Validation failures map to 400, missing resources to 404. Anything
//! unexpected is logged with context and surfaced as a generic 500 —
//! internal detail never leaks into a response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use grimdeck_document::DocumentError;
use grimdeck_engine::EngineError;
use grimdeck_protocol::ProtocolError;
use grimdeck_store::StoreError;
use serde_json::json;

/// An HTTP-shaped error: status plus client-safe message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// A 500 with a generic body. The real cause goes to the log only.
    pub fn internal(context: &str, error: impl std::fmt::Display) -> Self {
        tracing::error!(context, error = %error, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<ProtocolError> for ApiError {
    fn from(e: ProtocolError) -> Self {
        // A malformed room or chain id can never name an existing
        // resource.
        Self::new(StatusCode::NOT_FOUND, e.to_string())
    }
}

impl From<DocumentError> for ApiError {
    fn from(e: DocumentError) -> Self {
        match &e {
            DocumentError::RoomNotFound(_)
            | DocumentError::PlayerNotInRoom(..) => {
                Self::new(StatusCode::NOT_FOUND, e.to_string())
            }
            DocumentError::RoomFull(_)
            | DocumentError::MutationBlocked { .. } => {
                Self::new(StatusCode::BAD_REQUEST, e.to_string())
            }
            DocumentError::Snapshot(_) | DocumentError::Store(_) => {
                Self::internal("document", e)
            }
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match &e {
            EngineError::PlayerNotFound(_)
            | EngineError::UnknownCard(_)
            | EngineError::UnknownMonster(_)
            | EngineError::ChainNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, e.to_string())
            }
            EngineError::NotYourTurn(_)
            | EngineError::InsufficientActionPoints { .. }
            | EngineError::InsufficientCards { .. }
            | EngineError::UnsupportedLocation { .. }
            | EngineError::WrongPhase { .. }
            | EngineError::EmptyRoom(_)
            | EngineError::ChainNotAwaitingInput(_)
            | EngineError::InvalidInput(_) => {
                Self::new(StatusCode::BAD_REQUEST, e.to_string())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::internal("store", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_your_turn_is_bad_request() {
        let err: ApiError = EngineError::NotYourTurn("p1".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("not your turn"));
    }

    #[test]
    fn test_room_not_found_is_404() {
        let err: ApiError =
            DocumentError::RoomNotFound("AAAA22".parse().unwrap()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_errors_surface_as_generic_500() {
        let err: ApiError =
            StoreError::MissingRow("AAAA22".parse().unwrap()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "internal server error");
    }
}
