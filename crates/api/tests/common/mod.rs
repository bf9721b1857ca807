#![allow(dead_code)]

use std::path::Path;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use bosssec_api::config::ServerConfig;
use bosssec_api::router::build_app_router;
use bosssec_api::state::AppState;
use bosssec_core::compiler::CompilerOptions;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// The dialplan output goes to `dialplan_path`, which tests point into a
/// temporary directory.
pub fn test_config(dialplan_path: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        dialplan_output_path: dialplan_path.to_path_buf(),
        compiler: CompilerOptions::default(),
    }
}

/// Build state and the full application router over `pool`.
///
/// Returns the state too, so tests can inspect the reload flag.
pub fn build_test_app_with_state(pool: SqlitePool, dialplan_path: &Path) -> (Router, AppState) {
    let state = AppState::new(pool, test_config(dialplan_path));
    (build_app_router(state.clone()), state)
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(pool: SqlitePool) -> Router {
    let path = std::env::temp_dir().join("bosssec-unused-dialplan.conf");
    build_test_app_with_state(pool, &path).0
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    json_request(app, Method::POST, uri, json).await
}

pub async fn put_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    json_request(app, Method::PUT, uri, json).await
}

async fn json_request(app: Router, method: Method, uri: &str, json: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST an url-encoded form body such as `action=add&boss_extension=200`.
pub async fn post_form(app: Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Create a rule through the API and return its id.
pub async fn create_rule(
    pool: &SqlitePool,
    boss: &str,
    secretary: &str,
    whitelist: &str,
) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/rules",
        serde_json::json!({
            "boss_name": format!("Boss {boss}"),
            "boss_extension": boss,
            "secretary_extension": secretary,
            "whitelist": whitelist,
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
