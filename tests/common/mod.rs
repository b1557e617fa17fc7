#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use ws_api_rust::auth::{PermissionCode, Principal, TokenCodec};
use ws_api_rust::config::AppConfig;
use ws_api_rust::database::{MemoryPermissionStore, PermissionStore};
use ws_api_rust::{app, AppState};

pub const SECRET: &str = "integration-test-secret-0123456789";

pub fn codec() -> TokenCodec {
    TokenCodec::new(SECRET, 3600, 0).expect("codec")
}

pub fn principal(email: &str) -> Principal {
    Principal {
        user_id: Uuid::new_v4(),
        email: email.to_string(),
    }
}

pub fn code(raw: &str) -> PermissionCode {
    PermissionCode::parse(raw).expect("valid permission code")
}

pub fn state(store: Arc<dyn PermissionStore>) -> AppState {
    let mut config = AppConfig::development();
    config.security.jwt_secret = SECRET.to_string();
    config.api.enable_request_logging = false;
    AppState::new(config, codec(), store)
}

pub fn router_with(store: Arc<dyn PermissionStore>) -> Router {
    app(state(store))
}

pub fn router(store: MemoryPermissionStore) -> Router {
    router_with(Arc::new(store))
}

pub fn bearer(principal: &Principal) -> String {
    format!("Bearer {}", codec().issue(principal).expect("issue token"))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Drive one request through the router without binding a socket
pub async fn send(router: Router, request: Request<Body>) -> Result<TestResponse> {
    let response = router.oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok(TestResponse { status, body })
}

pub fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

pub async fn get_as(router: Router, uri: &str, authorization: Option<&str>) -> Result<TestResponse> {
    let mut builder = get(uri);
    if let Some(value) = authorization {
        builder = builder.header(AUTHORIZATION, value);
    }
    send(router, builder.body(Body::empty())?).await
}
