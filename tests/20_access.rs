mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{TestServer, ADMIN_ROLE, STATUS_OPEN, USER_ROLE};

#[tokio::test]
async fn reference_lists_are_public() -> Result<()> {
    let server = TestServer::spawn().await?;

    for path in ["/offices", "/user-roles", "/incident-statuses", "/device-types"] {
        let res = server.get(path, None).await?;
        assert_eq!(res.status(), StatusCode::OK, "{}", path);
        assert!(res.json::<Value>().await?.is_array(), "{}", path);
    }

    let statuses: Value = server.get("/incident-statuses", None).await?.json().await?;
    let names: Vec<&str> = statuses
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert_eq!(names, ["open", "in_progress", "resolved", "closed"]);

    let role: Value = server.get("/user-roles/1", None).await?.json().await?;
    assert_eq!(role, json!({ "role_id": 1, "name": "admin" }));

    assert_eq!(server.get("/user-roles/99", None).await?.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn non_admin_cannot_create_users() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;
    let (_, token) = server.regular_user(&admin, "tech@incidents.test").await?;

    let res = server
        .post(
            "/users",
            Some(&token),
            &json!({
                "first_name": "Sneaky",
                "last_name": "User",
                "email": "sneaky@incidents.test",
                "password": "password123",
                "role_id": ADMIN_ROLE,
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "FORBIDDEN");

    assert_eq!(server.get("/users", Some(&token)).await?.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn admin_creates_retrievable_user() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;

    let created = server
        .create_user(&admin, "kaladin@incidents.test", USER_ROLE, None)
        .await?;
    assert!(created.get("password_hash").is_none());

    let id = created["user_id"].as_i64().unwrap();
    let res = server.get(&format!("/users/{}", id), Some(&admin)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await?;
    assert_eq!(fetched, created);

    // The new user can log in with the password given at creation.
    server.login("kaladin@incidents.test", "password123").await?;
    Ok(())
}

#[tokio::test]
async fn duplicate_email_conflicts() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;

    let first = server.create_user(&admin, "dup@incidents.test", USER_ROLE, None).await?;

    let res = server
        .post(
            "/users",
            Some(&admin),
            &json!({
                "first_name": "Second",
                "last_name": "Copy",
                "email": "dup@incidents.test",
                "password": "password123",
                "role_id": USER_ROLE,
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let users: Value = server.get("/users", Some(&admin)).await?.json().await?;
    let matching: Vec<&Value> = users
        .as_array()
        .unwrap()
        .iter()
        .filter(|u| u["email"] == "dup@incidents.test")
        .collect();
    assert_eq!(matching, vec![&first]);
    Ok(())
}

#[tokio::test]
async fn malformed_payloads_are_unprocessable() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;

    // Missing required field
    let res = server
        .post("/users", Some(&admin), &json!({ "first_name": "No", "last_name": "Email" }))
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Well-formed but failing field checks
    let res = server
        .post(
            "/users",
            Some(&admin),
            &json!({
                "first_name": "",
                "last_name": "Person",
                "email": "not-an-email",
                "password": "password123",
                "role_id": USER_ROLE,
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["email"].is_string());
    assert!(body["field_errors"]["first_name"].is_string());
    Ok(())
}

#[tokio::test]
async fn incident_permissions_split_by_role() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;
    let office = server.create_office(&admin, "Kholinar").await?;
    let (user, token) = server.regular_user(&admin, "reporter@incidents.test").await?;

    // Any authenticated user may open and update incidents.
    let incident = server
        .create_incident(
            &token,
            &json!({ "status_id": STATUS_OPEN, "description": "VPN down", "office_id": office }),
        )
        .await?;
    assert_eq!(incident["reporter_id"], user["user_id"]);

    let id = incident["incident_id"].as_i64().unwrap();
    let res = server
        .put(&format!("/incidents/{}", id), Some(&token), &json!({ "description": "VPN flaky" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Only administrators may delete them.
    let res = server.delete(&format!("/incidents/{}", id), Some(&token)).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.delete(&format!("/incidents/{}", id), Some(&admin)).await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.get(&format!("/incidents/{}", id), Some(&token)).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn reference_and_device_writes_need_admin() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;
    let (_, token) = server.regular_user(&admin, "plain@incidents.test").await?;

    let res = server.post("/offices", Some(&token), &json!({ "city": "Urithiru" })).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.post("/offices", None, &json!({ "city": "Urithiru" })).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let office = server.create_office(&admin, "Urithiru").await?;
    let device = json!({ "office_id": office, "type_id": 1 });

    let res = server.post("/devices", Some(&token), &device).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server.post("/devices", Some(&admin), &device).await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server.get("/devices", Some(&token)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn non_numeric_ids_get_json_errors() -> Result<()> {
    let server = TestServer::spawn().await?;
    let admin = server.admin_token().await?;

    for (path, token) in [("/users/abc", Some(admin.as_str())), ("/user-roles/abc", None)] {
        let res = server.get(path, token).await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", path);

        let body: Value = res.json().await?;
        assert_eq!(body["error"], true, "{}", path);
        assert_eq!(body["code"], "BAD_REQUEST", "{}", path);
    }
    Ok(())
}
