mod common;

use anyhow::Result;
use chrono::Duration;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{TestServer, ADMIN_EMAIL, ADMIN_PASSWORD, JWT_SECRET};
use incident_api::auth::TokenService;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.get("/health", None).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn login_returns_bearer_token() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .post("/login", None, &json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    Ok(())
}

#[tokio::test]
async fn unknown_email_and_wrong_password_look_the_same() -> Result<()> {
    let server = TestServer::spawn().await?;

    let wrong_password = server
        .post("/login", None, &json!({ "email": ADMIN_EMAIL, "password": "nope" }))
        .await?;
    let unknown_email = server
        .post("/login", None, &json!({ "email": "ghost@incidents.test", "password": ADMIN_PASSWORD }))
        .await?;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let a: Value = wrong_password.json().await?;
    let b: Value = unknown_email.json().await?;
    assert_eq!(a, b);
    Ok(())
}

#[tokio::test]
async fn me_requires_a_token() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.get("/me", None).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["www-authenticate"], "Bearer");

    let body: Value = res.json().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let res = server.get("/me", Some("not-a-jwt")).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn me_returns_current_user_without_hash() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.admin_token().await?;

    let res = server.get("/me", Some(&token)).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["email"], ADMIN_EMAIL);
    assert_eq!(body["role_id"], 1);
    assert!(body["user_id"].is_i64());
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn expired_token_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;

    // Zero lifetime: expiry equals issue time, which already counts as expired.
    let tokens = TokenService::new(JWT_SECRET, Duration::zero())?;
    let token = tokens.issue(ADMIN_EMAIL)?;

    let res = server.get("/me", Some(&token)).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_signed_with_another_key_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;

    let forged = TokenService::new("some-other-secret", Duration::minutes(30))?.issue(ADMIN_EMAIL)?;

    let res = server.get("/me", Some(&forged)).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_for_deleted_user_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;
    let (user, token) = server.regular_user(&admin, "temp@incidents.test").await?;

    assert_eq!(server.get("/me", Some(&token)).await?.status(), StatusCode::OK);

    let id = user["user_id"].as_i64().unwrap();
    let res = server.delete(&format!("/users/{}", id), Some(&admin)).await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    assert_eq!(server.get("/me", Some(&token)).await?.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
