use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::{ingest::IngestError, validation::FieldErrors};

#[derive(Debug)]
pub enum AppError {
    /// 400 with `{"detail": …}`, for bodies that are not JSON at all.
    BadRequest(String),
    /// 400 with the per-field error map as the body.
    Validation(FieldErrors),
    /// 404 with `{"error": …}`.
    NotFound(String),
    /// 500 with `{"error": …}`.
    Internal(anyhow::Error),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn from_ingest(err: IngestError) -> Self {
        match err {
            IngestError::Validation(errors) => Self::Validation(errors),
            e @ IngestError::FridgeNotFound(_) => Self::NotFound(e.to_string()),
            IngestError::Storage(e) => Self::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
            }
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            AppError::Internal(e) => {
                error!(error = %e, "Request failed");
                let body = Json(json!({ "error": e.to_string() }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(e: E) -> Self {
        Self::Internal(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_errors_map_to_client_and_server_statuses() {
        let mut errors = FieldErrors::new();
        errors.add("sensor1_temp", "This field is required.");

        let cases = [
            (IngestError::Validation(errors), StatusCode::BAD_REQUEST),
            (IngestError::FridgeNotFound(9), StatusCode::NOT_FOUND),
            (
                IngestError::Storage(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from_ingest(err).into_response().status(), status);
        }
    }

    #[test]
    fn anyhow_errors_are_internal() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
