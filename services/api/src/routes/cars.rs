//! Car endpoints

use axum::{
    Json, Router,
    extract::{OriginalUri, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tracing::info;

use super::{PageQuery, RecordId};
use crate::{
    AppState,
    error::ApiResult,
    models::Car,
    pagination::Page,
    repositories::RepositoryError,
    serializers::{JsonBody, Mode, car_draft},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cars", get(list_cars).post(create_car))
        .route("/cars/", get(list_cars).post(create_car))
        .route(
            "/cars/:id",
            get(get_car).put(replace_car).patch(update_car).delete(delete_car),
        )
        .route(
            "/cars/:id/",
            get(get_car).put(replace_car).patch(update_car).delete(delete_car),
        )
}

async fn find_car(state: &AppState, id: i64) -> ApiResult<Car> {
    state
        .cars
        .find_by_id(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Car", id).into())
}

/// List cars, one page at a time
pub async fn list_cars(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    PageQuery(request): PageQuery,
) -> ApiResult<impl IntoResponse> {
    let (cars, count) = state.cars.list(request.window()).await?;

    Ok(Json(Page::new(request, uri.path(), cars, count)))
}

/// Create a car listing
pub async fn create_car(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let draft = car_draft(&body, Mode::Create, None)?;
    let car = state.cars.create(&draft).await?;

    Ok((StatusCode::CREATED, Json(car)))
}

/// Get a car by ID
pub async fn get_car(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(find_car(&state, id).await?))
}

/// Replace every writable field of a car
pub async fn replace_car(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let merge = |current: &Car| car_draft(&body, Mode::Replace, Some(current));
    let car = state.cars.update(id, &merge).await?;

    Ok(Json(car))
}

/// Change only the fields present in the body
pub async fn update_car(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let merge = |current: &Car| car_draft(&body, Mode::Partial, Some(current));
    let car = state.cars.update(id, &merge).await?;

    Ok(Json(car))
}

/// Delete a car together with its sales
pub async fn delete_car(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.cars.delete(id).await?;
    info!("Car {} removed from inventory", id);

    Ok(Json(json!({
        "message": "Car deleted successfully",
        "id": id,
        "sales_deleted": outcome.sales_deleted,
    })))
}
