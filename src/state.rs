use std::sync::Arc;

use chrono::Duration;

use crate::auth::{AccessControl, CredentialHasher, PasswordError, TokenError, TokenService};
use crate::config::AppConfig;
use crate::database::store::EntityStore;
use crate::services::{HistoryRecorder, UserService};

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Everything a handler needs, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn EntityStore>,
    pub tokens: TokenService,
    pub access: AccessControl,
    pub users: UserService,
    pub history: HistoryRecorder,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn EntityStore>) -> Result<Self, StateError> {
        let security = &config.security;
        let tokens = TokenService::new(
            &security.jwt_secret,
            Duration::minutes(security.token_expiry_minutes),
        )?;
        let hasher =
            CredentialHasher::with_cost(security.password_memory_kib, security.password_iterations)?;
        Ok(Self::from_parts(config, store, tokens, hasher))
    }

    /// Assemble from prebuilt services, e.g. a token service with a fixed clock.
    pub fn from_parts(
        config: AppConfig,
        store: Arc<dyn EntityStore>,
        tokens: TokenService,
        hasher: CredentialHasher,
    ) -> Self {
        Self {
            access: AccessControl::new(config.security.admin_role_id),
            users: UserService::new(store.clone(), hasher),
            history: HistoryRecorder::new(store.clone()),
            config: Arc::new(config),
            store,
            tokens,
        }
    }
}
