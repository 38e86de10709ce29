//! User endpoints

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
    models::User,
    pagination::Page,
    repositories::RepositoryError,
    serializers::{JsonBody, Mode, user_draft},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(replace_user).patch(update_user).delete(delete_user),
        )
        .route(
            "/users/:id/",
            get(get_user).put(replace_user).patch(update_user).delete(delete_user),
        )
}

async fn find_user(state: &AppState, id: i64) -> ApiResult<User> {
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("User", id).into())
}

/// List users, one page at a time
pub async fn list_users(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    PageQuery(request): PageQuery,
) -> ApiResult<impl IntoResponse> {
    let (users, count) = state.users.list(request.window()).await?;

    Ok(Json(Page::new(request, uri.path(), users, count)))
}

/// Create a user account
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let draft = user_draft(&body, Mode::Create, None)?;
    let user = state.users.create(&draft).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(find_user(&state, id).await?))
}

/// Replace every writable field of a user
pub async fn replace_user(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let merge = |current: &User| user_draft(&body, Mode::Replace, Some(current));
    let user = state.users.update(id, &merge).await?;

    Ok(Json(user))
}

/// Change only the fields present in the body
pub async fn update_user(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    JsonBody(body): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let merge = |current: &User| user_draft(&body, Mode::Partial, Some(current));
    let user = state.users.update(id, &merge).await?;

    Ok(Json(user))
}

/// Delete a user; cars they listed lose their `owner`
pub async fn delete_user(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.users.delete(id).await?;
    info!("User {} removed", id);

    Ok(Json(json!({
        "message": "User deleted successfully",
        "id": id,
        "cars_released": outcome.cars_released,
    })))
}
