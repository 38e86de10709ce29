//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::{repositories::RepositoryError, validation::FieldErrors};

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// One or more fields failed validation
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unknown record
    #[error("{0}")]
    NotFound(String),

    /// Write rejected by a referential integrity rule
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage failure while serving a request
    #[error("Storage error: {0}")]
    Storage(#[source] sqlx::Error),
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            RepositoryError::Validation(errors) => ApiError::Validation(errors),
            RepositoryError::Integrity(msg) => ApiError::Conflict(msg),
            RepositoryError::Database(e) => ApiError::Storage(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(fields) => {
                warn!("Validation failed: {}", fields);
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "Validation failed", "fields": fields }),
                )
            }
            ApiError::BadRequest(msg) => {
                warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Conflict(msg) => {
                warn!("Conflict: {}", msg);
                (StatusCode::CONFLICT, json!({ "error": msg }))
            }
            ApiError::Storage(e) => {
                error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Database error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_list_fields() {
        let (status, body) =
            render(ApiError::Validation(FieldErrors::single("vin", "taken"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fields"]["vin"][0], "taken");
    }

    #[tokio::test]
    async fn repository_not_found_maps_to_404() {
        let err: ApiError = RepositoryError::NotFound {
            entity: "Car",
            id: 9,
        }
        .into();
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Car with id 9 not found");
    }

    #[tokio::test]
    async fn integrity_maps_to_conflict() {
        let err: ApiError = RepositoryError::Integrity("sale references a missing car".into()).into();
        let (status, _) = render(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn storage_errors_hide_details() {
        let (status, body) = render(ApiError::Storage(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Database error");
    }
}
