use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::auth::AccessError;
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// The user resolved from the bearer token, inserted by [`require_user`].
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Bearer authentication for protected routes.
///
/// The token subject is the user's email; a valid token whose user no longer
/// exists is rejected like a bad token.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers()).ok_or_else(|| {
        debug!("Request without bearer token");
        ApiError::invalid_credentials()
    })?;

    let email = state.tokens.verify(&token)?;
    let user = state.store.get_user_by_email(&email).await?.ok_or_else(|| {
        warn!("Token subject {} has no matching user", email);
        ApiError::invalid_credentials()
    })?;

    debug!("Authenticated user {} ({})", user.id, user.email);
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AccessError::Unauthenticated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")).as_deref(), Some("abc.def.ghi"));
        assert_eq!(extract_bearer(&headers("bearer abc")).as_deref(), Some("abc"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert!(extract_bearer(&headers("Basic dXNlcjpwdw==")).is_none());
        assert!(extract_bearer(&headers("Bearer ")).is_none());
        assert!(extract_bearer(&headers("Bearer")).is_none());
        assert!(extract_bearer(&HeaderMap::new()).is_none());
    }
}
