// handlers/protected/reference.rs - writes to offices and lookup tables, administrators only

use axum::extract::State;

use crate::auth::Operation;
use crate::database::models::Validate;
use crate::handlers::reference::ReferenceTable;
use crate::handlers::{deleted, found};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

pub async fn create<T: ReferenceTable>(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(payload): ApiJson<T::New>,
) -> ApiResult<T::Record> {
    state.access.authorize(Some(&user), Operation::WriteReference)?;
    payload.validate()?;
    Ok(ApiResponse::created(T::create(state.store.as_ref(), payload).await?))
}

pub async fn update<T: ReferenceTable>(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<T::Patch>,
) -> ApiResult<T::Record> {
    state.access.authorize(Some(&user), Operation::WriteReference)?;
    payload.validate()?;
    let updated = T::update(state.store.as_ref(), id, payload).await?;
    Ok(ApiResponse::success(found(updated, T::NAME, id)?))
}

/// Deleting an office cascades to its users, devices and incidents; deleting a
/// lookup row that is still referenced is a 409.
pub async fn delete<T: ReferenceTable>(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<()> {
    state.access.authorize(Some(&user), Operation::WriteReference)?;
    deleted(T::delete(state.store.as_ref(), id).await?, T::NAME, id)
}
