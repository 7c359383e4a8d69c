// handlers/public/auth.rs - POST /login

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::Operation;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// POST /login - exchange email and password for a bearer token.
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<TokenResponse> {
    state.access.authorize(None, Operation::Login)?;

    let user = state
        .users
        .authenticate(&body.email, &body.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Incorrect email or password"))?;

    let access_token = state.tokens.issue(&user.email)?;
    info!("User {} logged in", user.id);

    Ok(ApiResponse::success(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
