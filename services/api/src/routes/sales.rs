//! Sale endpoints

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
    models::Sale,
    pagination::Page,
    repositories::RepositoryError,
    serializers::{JsonBody, Mode, sale_draft},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(create_sale))
        .route("/sales/", get(list_sales).post(create_sale))
        .route(
            "/sales/:id",
            get(get_sale).put(replace_sale).patch(update_sale).delete(delete_sale),
        )
        .route(
            "/sales/:id/",
            get(get_sale).put(replace_sale).patch(update_sale).delete(delete_sale),
        )
}

async fn find_sale(state: &AppState, id: i64) -> ApiResult<Sale> {
    state
        .sales
        .find_by_id(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Sale", id).into())
}

/// List sales, one page at a time
pub async fn list_sales(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    PageQuery(request): PageQuery,
) -> ApiResult<impl IntoResponse> {
    let (sales, count) = state.sales.list(request.window()).await?;

    Ok(Json(Page::new(request, uri.path(), sales, count)))
}

/// Record a sale
pub async fn create_sale(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let draft = sale_draft(&body, Mode::Create, None)?;
    let sale = state.sales.create(&draft).await?;

    Ok((StatusCode::CREATED, Json(sale)))
}

/// Get a sale by ID
pub async fn get_sale(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(find_sale(&state, id).await?))
}

/// Replace every writable field of a sale
pub async fn replace_sale(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let merge = |current: &Sale| sale_draft(&body, Mode::Replace, Some(current));
    let sale = state.sales.update(id, &merge).await?;

    Ok(Json(sale))
}

/// Change only the fields present in the body
pub async fn update_sale(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let merge = |current: &Sale| sale_draft(&body, Mode::Partial, Some(current));
    let sale = state.sales.update(id, &merge).await?;

    Ok(Json(sale))
}

/// Delete a sale record
pub async fn delete_sale(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<impl IntoResponse> {
    state.sales.delete(id).await?;
    info!("Sale {} removed", id);

    Ok(Json(json!({
        "message": "Sale deleted successfully",
        "id": id,
    })))
}
