use axum::extract::State;

use crate::auth::Operation;
use crate::database::models::User;
use crate::middleware::{ApiPath, ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

/// GET /me - the authenticated user's own record
pub async fn me(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> ApiResult<User> {
    state.access.authorize(Some(&user), Operation::ReadSelf)?;
    Ok(ApiResponse::success(user))
}
