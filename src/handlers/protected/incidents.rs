// handlers/protected/incidents.rs - /incidents[/:id][/history]

use axum::extract::State;
use tracing::info;

use crate::auth::Operation;
use crate::database::models::{HistoryEntry, Incident, IncidentUpdate, NewIncident, Validate};
use crate::handlers::{deleted, found};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> ApiResult<Vec<Incident>> {
    state.access.authorize(Some(&user), Operation::ReadIncident)?;
    Ok(ApiResponse::success(state.store.list_incidents().await?))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Incident> {
    state.access.authorize(Some(&user), Operation::ReadIncident)?;
    let record = state.store.get_incident(id).await?;
    Ok(ApiResponse::success(found(record, "incident", id)?))
}

/// POST /incidents - the reporter defaults to the caller
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(mut payload): ApiJson<NewIncident>,
) -> ApiResult<Incident> {
    state.access.authorize(Some(&user), Operation::CreateIncident)?;
    payload.validate()?;
    payload.reporter_id.get_or_insert(user.id);

    let incident = state.store.create_incident(payload).await?;
    info!("User {} opened incident {}", user.id, incident.id);
    Ok(ApiResponse::created(incident))
}

/// PUT /incidents/:id - a status change also appends a history entry
/// carrying the optional `comment`
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<IncidentUpdate>,
) -> ApiResult<Incident> {
    state.access.authorize(Some(&user), Operation::UpdateIncident)?;
    payload.validate()?;

    let IncidentUpdate { patch, comment } = payload;
    let updated = state.store.update_incident(id, patch, comment).await?;
    Ok(ApiResponse::success(found(updated, "incident", id)?))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<()> {
    state.access.authorize(Some(&user), Operation::DeleteIncident)?;
    deleted(state.store.delete_incident(id).await?, "incident", id)
}

/// GET /incidents/:id/history - status transitions, oldest first
pub async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Vec<HistoryEntry>> {
    state.access.authorize(Some(&user), Operation::ReadHistory)?;
    Ok(ApiResponse::success(state.history.history(id).await?))
}
