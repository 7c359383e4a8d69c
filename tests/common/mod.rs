#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};

use incident_api::config::AppConfig;
use incident_api::database::MemoryStore;
use incident_api::server::{app, bootstrap};
use incident_api::AppState;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const ADMIN_EMAIL: &str = "admin@incidents.test";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const ADMIN_ROLE: i32 = 1;
pub const USER_ROLE: i32 = 3;
pub const STATUS_OPEN: i32 = 1;
pub const STATUS_RESOLVED: i32 = 3;

/// A real server on an ephemeral port, backed by a fresh in-memory store.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
            .with_test_writer()
            .try_init();

        let mut config = AppConfig::development();
        config.security.jwt_secret = JWT_SECRET.to_string();
        // Cheapest Argon2 cost keeps the suite fast.
        config.security.password_memory_kib = 8;
        config.security.password_iterations = 1;
        config.api.enable_request_logging = false;
        config.bootstrap.admin_email = Some(ADMIN_EMAIL.to_string());
        config.bootstrap.admin_password = Some(ADMIN_PASSWORD.to_string());

        let state = AppState::new(config, Arc::new(MemoryStore::new()))?;
        bootstrap(&state).await?;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            base_url,
            state,
            client: reqwest::Client::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_token(builder: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Response> {
        Ok(Self::with_token(self.client.get(self.url(path)), token).send().await?)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &Value) -> Result<Response> {
        Ok(Self::with_token(self.client.post(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: &Value) -> Result<Response> {
        Ok(Self::with_token(self.client.put(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<Response> {
        Ok(Self::with_token(self.client.delete(self.url(path)), token).send().await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .post("/login", None, &json!({ "email": email, "password": password }))
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
        let body: Value = res.json().await?;
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .context("missing access_token")
    }

    pub async fn admin_token(&self) -> Result<String> {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Creates a user through the API and returns its JSON record.
    pub async fn create_user(
        &self,
        admin: &str,
        email: &str,
        role_id: i32,
        office_id: Option<i64>,
    ) -> Result<Value> {
        let res = self
            .post(
                "/users",
                Some(admin),
                &json!({
                    "first_name": "Test",
                    "last_name": "User",
                    "email": email,
                    "password": "password123",
                    "role_id": role_id,
                    "office_id": office_id,
                }),
            )
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create user failed: {}", res.status());
        Ok(res.json().await?)
    }

    /// A non-admin user and their token.
    pub async fn regular_user(&self, admin: &str, email: &str) -> Result<(Value, String)> {
        let user = self.create_user(admin, email, USER_ROLE, None).await?;
        let token = self.login(email, "password123").await?;
        Ok((user, token))
    }

    pub async fn create_office(&self, admin: &str, city: &str) -> Result<i64> {
        let res = self.post("/offices", Some(admin), &json!({ "city": city })).await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create office failed: {}", res.status());
        let body: Value = res.json().await?;
        body["office_id"].as_i64().context("missing office_id")
    }

    pub async fn create_incident(&self, token: &str, body: &Value) -> Result<Value> {
        let res = self.post("/incidents", Some(token), body).await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create incident failed: {}", res.status());
        Ok(res.json().await?)
    }
}
