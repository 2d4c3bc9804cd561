//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use userhub_api::{AppState, build_app};
use userhub_auth::{SessionManager, UserDirectory};
use userhub_core::config::AppConfig;

/// An isolated users root and the configuration pointing at it.
pub struct TestEnv {
    /// Keeps the users root alive
    pub dir: TempDir,
    /// Application config rooted in `dir`
    pub config: AppConfig,
    /// The user directory
    pub users: UserDirectory,
}

impl TestEnv {
    /// A fresh environment allowing up to `max_users` users
    pub fn new(max_users: usize) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = AppConfig::default();
        config.storage.data_root = dir.path().to_string_lossy().into_owned();
        config.storage.lock_timeout_ms = 10_000;
        config.limits.max_users = max_users;
        config.credentials.argon2_memory_kib = 1024;
        config.credentials.argon2_iterations = 1;

        let users = UserDirectory::from_config(&config).expect("Failed to open user directory");
        Self { dir, config, users }
    }

    /// A second handle on the same users root, as another process would have
    pub fn reopen(&self) -> UserDirectory {
        UserDirectory::from_config(&self.config).expect("Failed to reopen user directory")
    }

    /// Create a user or panic
    pub fn create_user(&self, name: &str, password: &str, groups: &[&str]) {
        let groups = groups.iter().map(|g| g.to_string()).collect();
        self.users
            .create_user(name, password, groups)
            .expect("Failed to create user")
            .expect("User quota reached");
    }

    /// A session manager over this environment
    pub fn manager(&self) -> SessionManager {
        SessionManager::new(self.users.clone(), self.config.auth.clone())
    }

    /// A session manager over a second handle on the same users root
    pub fn reopen_manager(&self) -> SessionManager {
        SessionManager::new(self.reopen(), self.config.auth.clone())
    }

    /// An HTTP test app over this environment
    pub fn app(&self) -> TestApp {
        TestApp {
            router: build_app(AppState::new(self.config.clone(), self.users.clone())),
        }
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
}

impl TestApp {
    /// Log in and return the bearer token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({
                    "username": username,
                    "password": password,
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response
            .body
            .get("token")
            .and_then(|v| v.as_str())
            .expect("No token in login response")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("User-Agent", "integration-test")
            .header("X-Forwarded-For", "10.1.2.3, 10.0.0.1");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
