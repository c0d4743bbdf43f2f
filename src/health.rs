use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::task;

/// Health status for a component or the overall system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning but with degraded performance or partial failures
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

impl HealthStatus {
    /// Returns the HTTP status code for this health status
    pub fn status_code(&self) -> StatusCode {
        match self {
            HealthStatus::Healthy => StatusCode::OK,
            // Still serve traffic but indicate degradation
            HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Combines two health statuses, returning the worse of the two
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (HealthStatus::Unhealthy, _) | (_, HealthStatus::Unhealthy) => HealthStatus::Unhealthy,
            (HealthStatus::Degraded, _) | (_, HealthStatus::Degraded) => HealthStatus::Degraded,
            _ => HealthStatus::Healthy,
        }
    }
}

/// Health check result for a component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub component: String,
    /// Health status
    pub status: HealthStatus,
    /// Optional error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Timestamp of the check
    pub timestamp: i64,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ComponentHealth {
    /// Creates a healthy component health check
    pub fn healthy(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Healthy,
            error: None,
            timestamp: Self::now(),
            details: None,
        }
    }

    /// Creates a healthy component health check with details
    pub fn healthy_with_details(component: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Healthy,
            error: None,
            timestamp: Self::now(),
            details: Some(details),
        }
    }

    /// Creates a degraded component health check
    pub fn degraded(component: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Degraded,
            error: Some(error.into()),
            timestamp: Self::now(),
            details: None,
        }
    }

    /// Creates an unhealthy component health check
    pub fn unhealthy(component: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Unhealthy,
            error: Some(error.into()),
            timestamp: Self::now(),
            details: None,
        }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }
}

/// Overall health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall health status
    pub status: HealthStatus,
    /// Timestamp of the check
    pub timestamp: i64,
    /// Server version
    pub version: String,
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let status = self.status.status_code();
        (status, Json(self)).into_response()
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Readiness status
    pub ready: bool,
    /// Overall health status
    pub status: HealthStatus,
    /// Timestamp of the check
    pub timestamp: i64,
    /// Components that are not ready
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_ready: Vec<String>,
}

impl IntoResponse for ReadinessResponse {
    fn into_response(self) -> Response {
        let status = if self.ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        (status, Json(self)).into_response()
    }
}

/// Detailed component health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealthResponse {
    /// Overall health status
    pub status: HealthStatus,
    /// Timestamp of the check
    pub timestamp: i64,
    /// Individual component health checks
    pub components: HashMap<String, ComponentHealth>,
}

impl IntoResponse for ComponentHealthResponse {
    fn into_response(self) -> Response {
        let status = self.status.status_code();
        (status, Json(self)).into_response()
    }
}

/// Main health checker coordinator
#[derive(Clone)]
pub struct HealthChecker {
    state: Arc<AppState>,
}

impl HealthChecker {
    /// Creates a new health checker
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Performs a liveness check - returns healthy if server is running
    pub fn liveness(&self) -> HealthResponse {
        HealthResponse {
            status: HealthStatus::Healthy,
            timestamp: Self::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Performs a readiness check - returns ready if server can accept requests
    pub async fn readiness(&self) -> ReadinessResponse {
        let components = self.check_all_components().await;
        let mut overall = HealthStatus::Healthy;
        let mut not_ready = Vec::new();

        for (name, health) in &components {
            overall = overall.combine(health.status);
            if health.status == HealthStatus::Unhealthy {
                not_ready.push(name.clone());
            }
        }

        ReadinessResponse {
            ready: overall != HealthStatus::Unhealthy,
            status: overall,
            timestamp: Self::now(),
            not_ready,
        }
    }

    /// Performs detailed component health checks
    pub async fn components(&self) -> ComponentHealthResponse {
        let components = self.check_all_components().await;
        let mut overall = HealthStatus::Healthy;

        for health in components.values() {
            overall = overall.combine(health.status);
        }

        ComponentHealthResponse {
            status: overall,
            timestamp: Self::now(),
            components,
        }
    }

    /// Checks all components and returns their health status
    async fn check_all_components(&self) -> HashMap<String, ComponentHealth> {
        let mut components = HashMap::new();

        components.insert("database".to_string(), self.check_database().await);
        components.insert("templates".to_string(), self.check_templates());

        components
    }

    /// Checks database connectivity and row counts
    async fn check_database(&self) -> ComponentHealth {
        enum DatabaseProbe {
            Ok(crate::store::StoreStats),
            CountsUnavailable(rusqlite::Error),
            Unreachable(rusqlite::Error),
        }

        let store = self.state.store().clone();
        let probe = task::spawn_blocking(move || match store.ping() {
            Err(e) => DatabaseProbe::Unreachable(e),
            Ok(()) => match store.stats() {
                Ok(stats) => DatabaseProbe::Ok(stats),
                Err(e) => DatabaseProbe::CountsUnavailable(e),
            },
        })
        .await;

        let database_path = self.state.config().database_path.display().to_string();

        match probe {
            Ok(DatabaseProbe::Ok(stats)) => {
                let details = serde_json::json!({
                    "path": database_path,
                    "lists": stats.lists,
                    "items": stats.items,
                });
                ComponentHealth::healthy_with_details("database", details)
            }
            Ok(DatabaseProbe::CountsUnavailable(e)) => {
                ComponentHealth::degraded("database", format!("row counts unavailable: {}", e))
            }
            Ok(DatabaseProbe::Unreachable(e)) => {
                ComponentHealth::unhealthy("database", format!("database probe failed: {}", e))
            }
            Err(e) => {
                ComponentHealth::unhealthy("database", format!("database probe task failed: {}", e))
            }
        }
    }

    /// Checks that both page templates are registered
    fn check_templates(&self) -> ComponentHealth {
        let names: Vec<String> = self
            .state
            .templates()
            .get_template_names()
            .map(str::to_string)
            .collect();

        let missing: Vec<&str> = ["home.html", "list.html"]
            .into_iter()
            .filter(|required| !names.iter().any(|name| name == required))
            .collect();

        if missing.is_empty() {
            let details = serde_json::json!({ "templates": names });
            ComponentHealth::healthy_with_details("templates", details)
        } else {
            ComponentHealth::unhealthy(
                "templates",
                format!("missing templates: {}", missing.join(", ")),
            )
        }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }
}

/// Axum handler for liveness endpoint
pub async fn liveness_handler(State(checker): State<Arc<HealthChecker>>) -> impl IntoResponse {
    checker.liveness()
}

/// Axum handler for readiness endpoint
pub async fn readiness_handler(State(checker): State<Arc<HealthChecker>>) -> impl IntoResponse {
    checker.readiness().await
}

/// Axum handler for components endpoint
pub async fn components_handler(State(checker): State<Arc<HealthChecker>>) -> impl IntoResponse {
    checker.components().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_status_combine() {
        assert_eq!(
            HealthStatus::Healthy.combine(HealthStatus::Healthy),
            HealthStatus::Healthy
        );
        assert_eq!(
            HealthStatus::Healthy.combine(HealthStatus::Degraded),
            HealthStatus::Degraded
        );
        assert_eq!(
            HealthStatus::Healthy.combine(HealthStatus::Unhealthy),
            HealthStatus::Unhealthy
        );
        assert_eq!(
            HealthStatus::Degraded.combine(HealthStatus::Degraded),
            HealthStatus::Degraded
        );
        assert_eq!(
            HealthStatus::Degraded.combine(HealthStatus::Unhealthy),
            HealthStatus::Unhealthy
        );
        assert_eq!(
            HealthStatus::Unhealthy.combine(HealthStatus::Unhealthy),
            HealthStatus::Unhealthy
        );
    }

    #[test]
    fn component_health_constructors() {
        let healthy = ComponentHealth::healthy("test");
        assert_eq!(healthy.status, HealthStatus::Healthy);
        assert_eq!(healthy.component, "test");
        assert!(healthy.error.is_none());

        let degraded = ComponentHealth::degraded("test", "warning message");
        assert_eq!(degraded.status, HealthStatus::Degraded);
        assert_eq!(degraded.error, Some("warning message".to_string()));

        let unhealthy = ComponentHealth::unhealthy("test", "error message");
        assert_eq!(unhealthy.status, HealthStatus::Unhealthy);
        assert_eq!(unhealthy.error, Some("error message".to_string()));
    }

    #[test]
    fn health_status_codes() {
        assert_eq!(HealthStatus::Healthy.status_code(), StatusCode::OK);
        assert_eq!(HealthStatus::Degraded.status_code(), StatusCode::OK);
        assert_eq!(
            HealthStatus::Unhealthy.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
