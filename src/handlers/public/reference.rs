// handlers/public/reference.rs - GET /{offices,user-roles,incident-statuses,device-types}[/:id]

use axum::extract::State;

use crate::auth::Operation;
use crate::handlers::found;
use crate::handlers::reference::ReferenceTable;
use crate::middleware::{ApiPath, ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn list<T: ReferenceTable>(State(state): State<AppState>) -> ApiResult<Vec<T::Record>> {
    state.access.authorize(None, Operation::ReadReference)?;
    let records = T::list(state.store.as_ref()).await?;
    Ok(ApiResponse::success(records))
}

pub async fn get<T: ReferenceTable>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<T::Record> {
    state.access.authorize(None, Operation::ReadReference)?;
    let record = T::get(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success(found(record, T::NAME, id)?))
}
