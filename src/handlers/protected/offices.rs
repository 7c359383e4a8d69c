use axum::extract::State;

use crate::auth::Operation;
use crate::database::models::Incident;
use crate::handlers::found;
use crate::middleware::{ApiPath, ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

/// GET /offices/:id/incidents
pub async fn incidents(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Vec<Incident>> {
    state.access.authorize(Some(&user), Operation::ReadIncident)?;
    found(state.store.get_office(id).await?, "office", id)?;
    Ok(ApiResponse::success(state.store.incidents_for_office(id).await?))
}
