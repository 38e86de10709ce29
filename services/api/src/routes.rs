//! API service routes
//!
//! Every resource is mounted under `/api` and answers both with and without a
//! trailing slash (`/api/cars` and `/api/cars/`).

use axum::{
    Json, Router, async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{HeaderValue, StatusCode, request::Parts},
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};

use crate::{
    AppState,
    config::Settings,
    error::ApiError,
    pagination::{PageParams, PageRequest},
};

pub mod cars;
pub mod owners;
pub mod sales;
pub mod users;

/// Create the router for the API service
pub fn create_router(state: AppState, settings: &Settings) -> Router {
    let api = Router::new()
        .merge(cars::router())
        .merge(owners::router())
        .merge(sales::router())
        .merge(users::router());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&settings.cors_origins()))
        .with_state(state)
}

/// Any origin when none are configured, otherwise only the listed ones
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(allowed)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = match &state.db_pool {
        Some(pool) => match common::database::health_check(pool).await {
            Ok(healthy) => healthy,
            Err(e) => {
                error!("Health check failed: {}", e);
                false
            }
        },
        None => true,
    };

    let (status, label) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        status,
        Json(json!({
            "status": label,
            "service": "veloce-api",
            "storage": state.storage.as_str(),
        })),
    )
}

/// Record id taken from the `:id` path segment
///
/// Anything that is not an integer cannot name a record, so it is a 404
/// rather than a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound("Not found.".to_string()))?;

        raw.parse::<i64>()
            .map(RecordId)
            .map_err(|_| ApiError::NotFound("Not found.".to_string()))
    }
}

/// Resolved `?page=` / `?page_size=` of a list request
///
/// A query string that cannot be decoded at all (a repeated `page`, say) is
/// a 400 with the usual JSON error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery(pub PageRequest);

#[async_trait]
impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PageParams>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                warn!("Rejected query string: {}", rejection.body_text());
                ApiError::BadRequest(rejection.body_text())
            })?;

        Ok(PageQuery(PageRequest::from_params(&params)?))
    }
}
