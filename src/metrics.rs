/// Prometheus metrics for production observability.
///
/// Collects request counts and latencies per route alongside domain counters
/// for created lists and items. Row-count gauges are refreshed from the store
/// on every scrape.
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::time::Duration;

/// Global metrics registry instance
pub static METRICS: Lazy<Arc<MetricsCollector>> = Lazy::new(|| Arc::new(MetricsCollector::new()));

/// Labels for HTTP request metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    /// Route name (e.g., "home", "view_list")
    pub route: String,
    /// Response status code ("200", "303", "404", ...)
    pub status: String,
}

/// Labels for per-route latency metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RouteLabels {
    pub route: String,
}

/// Labels for error metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ErrorLabels {
    /// Error classification ("not_found", "storage", ...)
    pub category: String,
}

/// Central metrics collector with Prometheus registry
pub struct MetricsCollector {
    registry: RwLock<Registry>,

    /// Total HTTP requests by route and status
    pub http_requests_total: Family<RequestLabels, Counter>,

    /// Request duration in seconds by route
    pub http_request_duration_seconds: Family<RouteLabels, Histogram>,

    /// Total lists created since startup
    pub lists_created_total: Counter,

    /// Total items created since startup
    pub items_created_total: Counter,

    /// Total errors by category
    pub errors_total: Family<ErrorLabels, Counter>,

    /// Lists currently in the store
    pub lists_in_store: Gauge,

    /// Items currently in the store
    pub items_in_store: Gauge,
}

impl MetricsCollector {
    /// Create a new metrics collector with all metrics registered
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let http_requests_total = Family::<RequestLabels, Counter>::default();
        registry.register(
            "superlists_http_requests",
            "Total number of HTTP requests",
            http_requests_total.clone(),
        );

        let http_request_duration_seconds =
            Family::<RouteLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.001, 2.0, 12))
            });
        registry.register(
            "superlists_http_request_duration_seconds",
            "Request latency histogram in seconds",
            http_request_duration_seconds.clone(),
        );

        let lists_created_total = Counter::default();
        registry.register(
            "superlists_lists_created",
            "Total number of lists created",
            lists_created_total.clone(),
        );

        let items_created_total = Counter::default();
        registry.register(
            "superlists_items_created",
            "Total number of items created",
            items_created_total.clone(),
        );

        let errors_total = Family::<ErrorLabels, Counter>::default();
        registry.register(
            "superlists_errors",
            "Total number of request errors by category",
            errors_total.clone(),
        );

        let lists_in_store = Gauge::default();
        registry.register(
            "superlists_lists",
            "Number of lists currently stored",
            lists_in_store.clone(),
        );

        let items_in_store = Gauge::default();
        registry.register(
            "superlists_items",
            "Number of items currently stored",
            items_in_store.clone(),
        );

        Self {
            registry: RwLock::new(registry),
            http_requests_total,
            http_request_duration_seconds,
            lists_created_total,
            items_created_total,
            errors_total,
            lists_in_store,
            items_in_store,
        }
    }

    /// Encode metrics in Prometheus text format
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        let registry = self.registry.read();
        encode(&mut buffer, &registry).expect("encoding metrics should succeed");
        buffer
    }

    /// Record a completed request
    pub fn record_request(&self, route: &str, status: &str, duration: Duration) {
        self.http_requests_total
            .get_or_create(&RequestLabels {
                route: route.to_string(),
                status: status.to_string(),
            })
            .inc();

        self.http_request_duration_seconds
            .get_or_create(&RouteLabels {
                route: route.to_string(),
            })
            .observe(duration.as_secs_f64());
    }

    /// Record a created list
    pub fn record_list_created(&self) {
        self.lists_created_total.inc();
    }

    /// Record a created item
    pub fn record_item_created(&self) {
        self.items_created_total.inc();
    }

    /// Record a request error
    pub fn record_error(&self, category: &str) {
        self.errors_total
            .get_or_create(&ErrorLabels {
                category: category.to_string(),
            })
            .inc();
    }

    /// Update row-count gauges from store statistics
    pub fn update_store_counts(&self, lists: u64, items: u64) {
        self.lists_in_store.set(lists as i64);
        self.items_in_store.set(items as i64);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
