//! Integration tests for the HTTP API.

use axum::http::StatusCode;

use crate::helpers::TestEnv;

#[tokio::test]
async fn test_health() {
    let env = TestEnv::new(10);
    let response = env.app().request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_login_success() {
    let env = TestEnv::new(10);
    env.create_user("alice", "pw", &[]);

    let response = env
        .app()
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "alice",
                "password": "pw",
                "permanent": true,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["error"], "OK");
    assert_eq!(response.body["landing"], "/app");
    assert!(response.body["token"].as_str().is_some());
    assert_eq!(response.body["session"]["user"], "alice");
    assert_eq!(response.body["session"]["who"], "integration-test");
    assert_eq!(response.body["session"]["from"], "10.1.2.3");
    assert!(response.body["session"].get("token_hash").is_none());
}

#[tokio::test]
async fn test_login_incorrect_credentials() {
    let env = TestEnv::new(10);
    env.create_user("alice", "pw", &[]);
    let app = env.app();

    for (username, password) in [("alice", "wrong"), ("nobody", "pw")] {
        let response = app
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "username": username, "password": password })),
                None,
            )
            .await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["error"], "INCORRECT_CREDENTIALS");
        assert_eq!(response.body["redirect"], "/login?failed=1");
    }
}

#[tokio::test]
async fn test_login_empty_fields_rejected() {
    let env = TestEnv::new(10);
    let response = env
        .app()
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "", "password": "" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_session_routes_require_token() {
    let env = TestEnv::new(10);
    let app = env.app();

    let missing = app.request("GET", "/api/auth/session", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"], "NOT_AUTHORIZED");

    let bogus = app
        .request("GET", "/api/auth/session", None, Some("deadbeef"))
        .await;
    assert_eq!(bogus.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bogus.body["error"], "NOT_AUTHORIZED");
}

#[tokio::test]
async fn test_session_lifecycle() {
    let env = TestEnv::new(10);
    env.create_user("alice", "pw", &["admin"]);
    let app = env.app();

    let first = app.login("alice", "pw").await;
    let second = app.login("alice", "pw").await;
    let third = app.login("alice", "pw").await;

    let current = app
        .request("GET", "/api/auth/session", None, Some(&first))
        .await;
    assert_eq!(current.status, StatusCode::OK);
    assert_eq!(current.body["data"]["username"], "alice");

    let listing = app
        .request("GET", "/api/auth/sessions", None, Some(&first))
        .await;
    assert_eq!(listing.status, StatusCode::OK);
    assert_eq!(listing.body["data"]["sessions"].as_array().unwrap().len(), 3);
    assert!(listing.body["data"].get("hash").is_none());

    let logout = app
        .request("POST", "/api/auth/logout", None, Some(&third))
        .await;
    assert_eq!(logout.status, StatusCode::OK);
    let after = app
        .request("GET", "/api/auth/session", None, Some(&third))
        .await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);

    let others = app
        .request("POST", "/api/auth/logout_other", None, Some(&first))
        .await;
    assert_eq!(others.status, StatusCode::OK);
    assert_eq!(others.body["data"]["removed"], 1);

    let gone = app
        .request("GET", "/api/auth/session", None, Some(&second))
        .await;
    assert_eq!(gone.status, StatusCode::UNAUTHORIZED);
    let kept = app
        .request("GET", "/api/auth/session", None, Some(&first))
        .await;
    assert_eq!(kept.status, StatusCode::OK);
}
