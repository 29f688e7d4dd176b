//! Integration test harness for the PVZ service.
//!
//! Drives the full router in-process over the in-memory store, so no
//! database or running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pvz-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use pvz_server::config::{LogFormat, ServerConfig};
use pvz_server::db::memory::MemoryStore;
use pvz_server::routes;
use pvz_server::services::auth::PasswordHasher;
use pvz_server::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Response status, headers of interest and parsed JSON body.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
    pub request_id: Option<String>,
}

/// One in-process service instance.
pub struct TestApp {
    pub store: MemoryStore,
    pub state: AppState,
    router: Router,
}

fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("postgres://unused"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        jwt_secret: SecretString::from("kQ8#vN2$pL5!xR7@mT3^wZ9&bY4*cH6%"),
        jwt_expiration: Duration::from_secs(3600),
        request_timeout: Duration::from_secs(5),
        log_format: LogFormat::Text,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let hasher = PasswordHasher::new(8, 1, 1).unwrap();
        let state = AppState::with_hasher(test_config(), Arc::new(store.clone()), hasher).unwrap();
        let router = routes::router(state.clone());
        Self {
            store,
            state,
            router,
        }
    }

    /// Send a request, optionally with a bearer token and JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    /// Send a fully built request.
    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .map(|v| v.to_str().unwrap().to_owned());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        TestResponse {
            status,
            body,
            text,
            request_id,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        self.send(Method::POST, uri, token, body).await
    }

    /// Token for a synthetic user with `role`.
    pub async fn dummy_token(&self, role: &str) -> String {
        let response = self
            .post("/dummyLogin", None, Some(json!({ "role": role })))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        response.body["token"].as_str().unwrap().to_owned()
    }

    /// Create a pickup point as a moderator and return its id.
    pub async fn create_pickup_point(&self, city: &str) -> String {
        let moderator = self.dummy_token("moderator").await;
        let response = self
            .post("/pvz", Some(&moderator), Some(json!({ "city": city })))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.body["id"].as_str().unwrap().to_owned()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
