use anyhow::Result;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use donation_api::{create_router, AppState, Config};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const API_KEY: &str = "integration-test-key";

/// Router over an in-memory store with admin auth enabled.
pub fn test_app() -> Router {
    app_with(Config {
        api_key: Some(API_KEY.into()),
        ..Config::default()
    })
}

pub fn app_with(config: Config) -> Router {
    create_router(Arc::new(AppState::in_memory(config)))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.text)?)
    }
}

pub async fn send_raw(app: &Router, request: Request<Body>) -> Result<TestResponse> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(TestResponse {
        status,
        headers,
        text: String::from_utf8(bytes.to_vec())?,
    })
}

fn build(method: Method, uri: &str, body: Option<&Value>, api_key: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key).header("x-admin-id", "ops@example.org");
    }
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(b)?))?,
        None => builder.body(Body::empty())?,
    };
    Ok(request)
}

/// Unauthenticated request; returns status and parsed JSON body.
pub async fn public(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let response = send_raw(app, build(method, uri, body.as_ref(), None)?).await?;
    Ok((response.status, response.json()?))
}

/// Request carrying the admin API key.
pub async fn admin(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let response = send_raw(app, build(method, uri, body.as_ref(), Some(API_KEY))?).await?;
    Ok((response.status, response.json()?))
}

/// Seed the default foundations (vsf, cf) through the settings endpoint.
pub async fn seed_defaults(app: &Router) -> Result<()> {
    let (status, _) = admin(app, Method::GET, "/admin/foundation-settings", None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

/// Id of the foundation with `code`.
pub async fn foundation_id(app: &Router, code: &str) -> Result<String> {
    let (_, body) = admin(app, Method::GET, "/admin/foundations", None).await?;
    body["foundations"]
        .as_array()
        .and_then(|list| list.iter().find(|f| f["code"] == code))
        .and_then(|f| f["id"].as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("foundation {code} not found"))
}
