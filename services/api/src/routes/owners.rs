//! Owner endpoints

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
    models::Owner,
    pagination::Page,
    repositories::RepositoryError,
    serializers::{JsonBody, Mode, owner_draft},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/owners", get(list_owners).post(create_owner))
        .route("/owners/", get(list_owners).post(create_owner))
        .route(
            "/owners/:id",
            get(get_owner).put(replace_owner).patch(update_owner).delete(delete_owner),
        )
        .route(
            "/owners/:id/",
            get(get_owner).put(replace_owner).patch(update_owner).delete(delete_owner),
        )
}

async fn find_owner(state: &AppState, id: i64) -> ApiResult<Owner> {
    state
        .owners
        .find_by_id(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Owner", id).into())
}

/// List owners, one page at a time
pub async fn list_owners(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    PageQuery(request): PageQuery,
) -> ApiResult<impl IntoResponse> {
    let (owners, count) = state.owners.list(request.window()).await?;

    Ok(Json(Page::new(request, uri.path(), owners, count)))
}

/// Register a buyer
pub async fn create_owner(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let draft = owner_draft(&body, Mode::Create, None)?;
    let owner = state.owners.create(&draft).await?;

    Ok((StatusCode::CREATED, Json(owner)))
}

/// Get a owner by ID
pub async fn get_owner(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(find_owner(&state, id).await?))
}

/// Replace every writable field of a owner
pub async fn replace_owner(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let merge = |current: &Owner| owner_draft(&body, Mode::Replace, Some(current));
    let owner = state.owners.update(id, &merge).await?;

    Ok(Json(owner))
}

/// Change only the fields present in the body
pub async fn update_owner(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let merge = |current: &Owner| owner_draft(&body, Mode::Partial, Some(current));
    let owner = state.owners.update(id, &merge).await?;

    Ok(Json(owner))
}

/// Delete an owner together with their sales
pub async fn delete_owner(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.owners.delete(id).await?;
    info!("Owner {} removed", id);

    Ok(Json(json!({
        "message": "Owner deleted successfully",
        "id": id,
        "sales_deleted": outcome.sales_deleted,
    })))
}
