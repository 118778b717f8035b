//! Common test utilities for integration tests
//!
//! Every test gets its own router over a fresh in-memory store, so tests can
//! run in parallel without a database. Password hashing uses weak Argon2
//! parameters to keep the suite fast.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::password::HashParams;
use taskboard_shared::store::{MemoryStore, Store};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-key-that-is-at-least-32-bytes";

/// A signed-up user and their access token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
    pub refresh_token: String,
}

/// Test context holding the router and the store behind it
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<MemoryStore>,
    pub config: Config,
}

impl TestContext {
    pub fn new() -> Self {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("JWT_SECRET", TEST_SECRET),
            ("STORAGE_BACKEND", "memory"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
            .expect("test config");

        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn Store> = store.clone();
        let state = AppState::with_hash_params(
            dyn_store,
            config.clone(),
            HashParams {
                memory_kib: 8,
                iterations: 1,
                parallelism: 1,
            },
        )
        .expect("app state");

        Self {
            app: build_router(state),
            store,
            config,
        }
    }

    /// Sends a request and returns the status with the parsed JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!(
                    "non-JSON body with status {}: {}",
                    status,
                    String::from_utf8_lossy(&bytes)
                )
            })
        };

        (status, body)
    }

    /// Registers a user, panicking with the response body on failure
    pub async fn signup(&self, username: &str, password: &str) -> TestUser {
        let (status, body) = self
            .send(
                "POST",
                "/signup",
                None,
                Some(serde_json::json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": password,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "signup failed: {}", body);

        TestUser {
            id: uuid_at(&body, "/user/id"),
            username: username.to_string(),
            token: string_at(&body, "/token"),
            refresh_token: string_at(&body, "/refresh_token"),
        }
    }

    pub async fn create_workspace(&self, user: &TestUser, name: &str) -> Uuid {
        let (status, body) = self
            .send(
                "POST",
                "/workspaces",
                Some(&user.token),
                Some(serde_json::json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create workspace failed: {}", body);
        uuid_at(&body, "/workspaceId")
    }

    pub async fn create_container(&self, user: &TestUser, workspace_id: Uuid, name: &str) -> Uuid {
        let (status, body) = self
            .send(
                "POST",
                "/containers",
                Some(&user.token),
                Some(serde_json::json!({ "workspace_id": workspace_id, "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create container failed: {}", body);
        uuid_at(&body, "/containerId")
    }

    pub async fn create_task(&self, user: &TestUser, container_id: Uuid, text: &str) -> Uuid {
        let (status, body) = self
            .send(
                "POST",
                "/tasks",
                Some(&user.token),
                Some(serde_json::json!({ "list_container_id": container_id, "text": text })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create task failed: {}", body);
        uuid_at(&body, "/taskId")
    }

    pub async fn create_comment(&self, user: &TestUser, task_id: Uuid, text: &str) -> Uuid {
        let (status, body) = self
            .send(
                "POST",
                "/comments",
                Some(&user.token),
                Some(serde_json::json!({ "task_id": task_id, "text": text })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create comment failed: {}", body);
        uuid_at(&body, "/commentId")
    }

    /// (users, workspaces, containers, tasks, comments)
    pub async fn row_counts(&self) -> (usize, usize, usize, usize, usize) {
        self.store.row_counts().await
    }
}

pub fn string_at(body: &Value, pointer: &str) -> String {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("missing {} in {}", pointer, body))
        .to_string()
}

pub fn uuid_at(body: &Value, pointer: &str) -> Uuid {
    string_at(body, pointer).parse().unwrap()
}
