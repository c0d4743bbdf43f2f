//! HTTP surface: three list routes, the home page, and the operational
//! endpoints (health, readiness, components, metrics).

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::health::{self, HealthChecker};
use crate::lists;
use crate::metrics::METRICS;
use crate::model::ListId;
use crate::pages;
use crate::shutdown;
use crate::state::AppState;
use anyhow::Result;
use axum::{
    Router,
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::task;

/// Form body for both item-creating POST routes.
///
/// A missing `item_text` field deserializes as the empty string; empty text
/// is accepted and persisted silently.
#[derive(Debug, Deserialize)]
pub struct NewItemForm {
    #[serde(default)]
    pub item_text: String,
}

/// Builds the application router over shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let health_checker = Arc::new(HealthChecker::new(state.clone()));
    let health_routes = Router::new()
        .route("/health", get(health::liveness_handler))
        .route("/ready", get(health::readiness_handler))
        .route("/health/components", get(health::components_handler))
        .with_state(health_checker);

    Router::new()
        .route("/", get(home))
        .route("/lists/new", post(new_list))
        .route("/lists/{id}/", get(view_list))
        .route("/lists/{id}/add_item", post(add_item))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        .merge(health_routes)
}

/// Binds the listener and serves until a shutdown signal arrives.
pub async fn serve(config: Arc<ServerConfig>, state: Arc<AppState>) -> Result<()> {
    let router = build_router(state.clone());
    let listener = TcpListener::bind(config.http_bind_address).await?;
    let actual_addr = listener.local_addr()?;
    tracing::info!(bind = %actual_addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    let stats = state.op_stats();
    tracing::info!(
        lists_created = stats.lists_created,
        items_created = stats.items_created,
        "server stopped"
    );
    Ok(())
}

/// Runs a handler future, converting errors into responses and recording the
/// per-route request metrics.
async fn instrumented<F>(route: &'static str, handler: F) -> Response
where
    F: Future<Output = Result<Response, AppError>>,
{
    let started = Instant::now();
    let response = match handler.await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    };
    METRICS.record_request(route, response.status().as_str(), started.elapsed());
    response
}

/// GET `/`: the new-list form. Never writes to the store.
async fn home(State(state): State<Arc<AppState>>) -> Response {
    instrumented("home", async move {
        let html = pages::render_home(state.templates())?;
        Ok(Html(html).into_response())
    })
    .await
}

/// POST `/lists/new`: creates a list with its first item, then redirects to
/// the new list's page.
async fn new_list(State(state): State<Arc<AppState>>, Form(form): Form<NewItemForm>) -> Response {
    instrumented("new_list", async move {
        let list = lists::create_list(&state, form.item_text).await?;
        Ok(Redirect::to(&list.url()).into_response())
    })
    .await
}

/// GET `/lists/{id}/`: the list's items, 404 when the id is unknown.
async fn view_list(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    instrumented("view_list", async move {
        let (list, items) = lists::list_detail(&state, ListId(id)).await?;
        let html = pages::render_list(state.templates(), &list, &items)?;
        Ok(Html(html).into_response())
    })
    .await
}

/// POST `/lists/{id}/add_item`: appends an item, then redirects back to the
/// list's page. 404 when the id is unknown.
async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Form(form): Form<NewItemForm>,
) -> Response {
    instrumented("add_item", async move {
        let list = lists::add_item(&state, ListId(id), form.item_text).await?;
        Ok(Redirect::to(&list.url()).into_response())
    })
    .await
}

/// Prometheus metrics endpoint handler. Row-count gauges are refreshed from
/// the store on every scrape.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> (StatusCode, String) {
    let store = state.store().clone();
    match task::spawn_blocking(move || store.stats()).await {
        Ok(Ok(stats)) => METRICS.update_store_counts(stats.lists, stats.items),
        Ok(Err(error)) => tracing::warn!(%error, "store counts unavailable for scrape"),
        Err(error) => tracing::warn!(%error, "store count task failed"),
    }
    (StatusCode::OK, METRICS.encode())
}
