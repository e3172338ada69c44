use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use neogate_core::{ErrorBody, ErrorKind, NeoError};

// ==============================================================================
// Error Type
// ==============================================================================

pub(crate) enum AppError {
    NotFound(String),
    Neo(NeoError),
}

impl From<NeoError> for AppError {
    fn from(err: NeoError) -> Self {
        Self::Neo(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Neo(NeoError::validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Neo(NeoError::validation(rejection.body_text()))
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Network => StatusCode::BAD_GATEWAY,
        ErrorKind::Contract => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Transaction => StatusCode::CONFLICT,
        ErrorKind::RateLimit => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Wallet => StatusCode::UNAUTHORIZED,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    kind: ErrorKind::Validation,
                    message,
                    detail: None,
                }),
            )
                .into_response(),
            Self::Neo(err) => {
                let body = err.to_body();
                let status = status_for(body.kind);
                if status.is_server_error() {
                    tracing::warn!(kind = %body.kind, error = %body.message, "request failed");
                }
                (status, Json(body)).into_response()
            }
        }
    }
}
