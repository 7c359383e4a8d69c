// handlers/protected/devices.rs - /devices[/:id], writes administrators only

use axum::extract::State;

use crate::auth::Operation;
use crate::database::models::{Device, DevicePatch, NewDevice, Validate};
use crate::handlers::{deleted, found};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> ApiResult<Vec<Device>> {
    state.access.authorize(Some(&user), Operation::ReadDevice)?;
    Ok(ApiResponse::success(state.store.list_devices().await?))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Device> {
    state.access.authorize(Some(&user), Operation::ReadDevice)?;
    let record = state.store.get_device(id).await?;
    Ok(ApiResponse::success(found(record, "device", id)?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(payload): ApiJson<NewDevice>,
) -> ApiResult<Device> {
    state.access.authorize(Some(&user), Operation::WriteDevice)?;
    payload.validate()?;
    Ok(ApiResponse::created(state.store.create_device(payload).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<DevicePatch>,
) -> ApiResult<Device> {
    state.access.authorize(Some(&user), Operation::WriteDevice)?;
    payload.validate()?;
    let updated = state.store.update_device(id, payload).await?;
    Ok(ApiResponse::success(found(updated, "device", id)?))
}

/// DELETE /devices/:id - incidents keep their row with `device_id` cleared
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<()> {
    state.access.authorize(Some(&user), Operation::WriteDevice)?;
    deleted(state.store.delete_device(id).await?, "device", id)
}
