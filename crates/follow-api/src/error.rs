//! Mapping of domain failures to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use follow_types::{AuthError, BaseResponse, RelationshipError, StatusClass};

/// Any failure a handler can report. Rendered as the `{code, message}` envelope with the
/// HTTP status equal to `code`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Relationship(#[from] RelationshipError),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Relationship(e) => match e.status_class() {
                StatusClass::ClientError => StatusCode::BAD_REQUEST,
                StatusClass::Conflict => StatusCode::CONFLICT,
                StatusClass::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::Auth(AuthError::Unavailable(_)) => {
                "failed to validate credentials".to_string()
            }
            ApiError::Relationship(RelationshipError::StorageUnavailable(_)) => {
                "internal server error, please try again later".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        let body = BaseResponse::<()>::error(i32::from(status.as_u16()), self.public_message());
        (status, Json(body)).into_response()
    }
}
