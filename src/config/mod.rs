use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub token_expiry_minutes: i64,
    /// Users holding this role id pass administrator checks.
    pub admin_role_id: i32,
    /// Argon2 memory cost in KiB.
    pub password_memory_kib: u32,
    pub password_iterations: u32,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// One-time administrator created at startup when no user has this email.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub admin_email: Option<String>,
    #[serde(skip_serializing)]
    pub admin_password: Option<String>,
    pub admin_first_name: String,
    pub admin_last_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Required(&'static str),
}

const DEV_JWT_SECRET: &str = "development-only-signing-secret";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Refuses configurations that would sign tokens with a well-known secret.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment == Environment::Production
            && (self.security.jwt_secret.is_empty() || self.security.jwt_secret == DEV_JWT_SECRET)
        {
            return Err(ConfigError::Required("SECURITY_JWT_SECRET"));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("API_PORT").or_else(|_| env::var("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_TOKEN_EXPIRY_MINUTES") {
            self.security.token_expiry_minutes = v.parse().unwrap_or(self.security.token_expiry_minutes);
        }
        if let Ok(v) = env::var("SECURITY_ADMIN_ROLE_ID") {
            self.security.admin_role_id = v.parse().unwrap_or(self.security.admin_role_id);
        }
        if let Ok(v) = env::var("SECURITY_PASSWORD_MEMORY_KIB") {
            self.security.password_memory_kib = v.parse().unwrap_or(self.security.password_memory_kib);
        }
        if let Ok(v) = env::var("SECURITY_PASSWORD_ITERATIONS") {
            self.security.password_iterations = v.parse().unwrap_or(self.security.password_iterations);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Bootstrap admin
        if let Ok(v) = env::var("BOOTSTRAP_ADMIN_EMAIL") {
            self.bootstrap.admin_email = Some(v);
        }
        if let Ok(v) = env::var("BOOTSTRAP_ADMIN_PASSWORD") {
            self.bootstrap.admin_password = Some(v);
        }
        if let Ok(v) = env::var("BOOTSTRAP_ADMIN_FIRST_NAME") {
            self.bootstrap.admin_first_name = v;
        }
        if let Ok(v) = env::var("BOOTSTRAP_ADMIN_LAST_NAME") {
            self.bootstrap.admin_last_name = v;
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 8000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                token_expiry_minutes: 30,
                admin_role_id: 1,
                password_memory_kib: argon2::Params::DEFAULT_M_COST,
                password_iterations: argon2::Params::DEFAULT_T_COST,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            bootstrap: BootstrapConfig {
                admin_first_name: "Admin".to_string(),
                admin_last_name: "User".to_string(),
                ..Default::default()
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 8000,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_expiry_minutes: 30,
                admin_role_id: 1,
                password_memory_kib: argon2::Params::DEFAULT_M_COST,
                password_iterations: argon2::Params::DEFAULT_T_COST,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            bootstrap: BootstrapConfig {
                admin_first_name: "Admin".to_string(),
                admin_last_name: "User".to_string(),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.api.port, 8000);
        assert_eq!(config.security.token_expiry_minutes, 30);
        assert_eq!(config.security.admin_role_id, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_requires_secret() {
        let mut config = AppConfig::production();
        assert!(config.validate().is_err());

        config.security.jwt_secret = DEV_JWT_SECRET.to_string();
        assert!(config.validate().is_err());

        config.security.jwt_secret = "a-real-rotated-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_secret_is_not_serialized() {
        let config = AppConfig::development();
        let value = serde_json::to_value(&config).unwrap();
        assert!(value["security"].get("jwt_secret").is_none());
    }
}
