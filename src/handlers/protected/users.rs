// handlers/protected/users.rs - /users[/:id], administrators only

use axum::extract::State;

use crate::auth::Operation;
use crate::database::models::{CreateUser, UpdateUser, User, Validate};
use crate::handlers::{deleted, found};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> ApiResult<Vec<User>> {
    state.access.authorize(Some(&user), Operation::ListUsers)?;
    Ok(ApiResponse::success(state.store.list_users().await?))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<User> {
    state.access.authorize(Some(&user), Operation::ReadUser)?;
    let record = state.store.get_user(id).await?;
    Ok(ApiResponse::success(found(record, "user", id)?))
}

/// POST /users - the password is hashed before it reaches the store
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(payload): ApiJson<CreateUser>,
) -> ApiResult<User> {
    state.access.authorize(Some(&user), Operation::CreateUser)?;
    payload.validate()?;
    let created = state.users.create(payload).await?;
    Ok(ApiResponse::created(created))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateUser>,
) -> ApiResult<User> {
    state.access.authorize(Some(&user), Operation::UpdateUser)?;
    payload.validate()?;
    let updated = state.users.update(id, payload).await?;
    Ok(ApiResponse::success(found(updated, "user", id)?))
}

/// DELETE /users/:id - owned devices and linked incidents survive with the link cleared
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<()> {
    state.access.authorize(Some(&user), Operation::DeleteUser)?;
    deleted(state.store.delete_user(id).await?, "user", id)
}
