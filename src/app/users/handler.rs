//! 用户处理器

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use std::collections::BTreeMap;

use super::model::{DeletedUser, NewUser, SearchQuery, User, UserUpdate};
use crate::app::AppState;
use crate::core::{
    error::ApiError,
    extract::{QueryParams, UserIdPath, ValidatedJson},
};

pub async fn get_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
) -> Result<Json<User>, ApiError> {
    let user = state.users.get_user(id).await?;
    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
    ValidatedJson(payload): ValidatedJson<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.users.create_user(id, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
    ValidatedJson(payload): ValidatedJson<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .users
        .update_user(id, payload)
        .await
        .map_err(ApiError::for_mutation)?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
) -> Result<Json<DeletedUser>, ApiError> {
    let deleted = state
        .users
        .delete_user(id)
        .await
        .map_err(ApiError::for_mutation)?;
    Ok(Json(deleted))
}

pub async fn search_by_name(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<User>, ApiError> {
    let user = state.users.search_by_name(query.name.as_deref()).await?;
    Ok(Json(user))
}

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<i64, User>>, ApiError> {
    let users = state.users.list_users().await?;
    Ok(Json(users))
}
