//! Test helpers: each test gets its own in-memory store, so suites can run in
//! parallel without shared database state.
#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use std::path::PathBuf;
use std::sync::Arc;
use superlists::config::ServerConfig;
use superlists::server::build_router;
use superlists::state::AppState;
use superlists::store::Store;
use tower::ServiceExt;

pub fn test_state() -> Arc<AppState> {
    let config = Arc::new(ServerConfig {
        database_path: PathBuf::from(":memory:"),
        http_bind_address: "127.0.0.1:0".parse().expect("valid bind address"),
    });
    let store = Store::open_in_memory().expect("in-memory store opens");
    Arc::new(AppState::new(config, store).expect("templates compile"))
}

pub fn test_app() -> (Router, Arc<AppState>) {
    let state = test_state();
    (build_router(state.clone()), state)
}

pub async fn get(router: &Router, uri: &str) -> Response {
    router
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request routes")
}

pub async fn post_form(router: &Router, uri: &str, body: &str) -> Response {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("request routes")
}

pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body is utf-8")
}

pub fn location_header(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("redirect carries a location header")
}
