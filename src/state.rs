use crate::config::ServerConfig;
use crate::pages;
use crate::store::Store;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tera::Tera;

/// Shared application state handed to every request handler.
///
/// Holds the configuration, the SQLite-backed store, and the compiled
/// templates. Templates are compiled once here so a syntax error fails
/// startup instead of the first render.
pub struct AppState {
    config: Arc<ServerConfig>,
    store: Store,
    templates: Tera,
    /// Lists created since startup, for monitoring
    lists_created: AtomicU64,
    /// Items created since startup, for monitoring
    items_created: AtomicU64,
}

/// Operation counters for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpStats {
    pub lists_created: u64,
    pub items_created: u64,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>, store: Store) -> tera::Result<Self> {
        let templates = pages::build_templates()?;
        Ok(Self {
            config,
            store,
            templates,
            lists_created: AtomicU64::new(0),
            items_created: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn templates(&self) -> &Tera {
        &self.templates
    }

    pub fn record_list_created(&self) {
        self.lists_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_item_created(&self) {
        self.items_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Get operation statistics
    pub fn op_stats(&self) -> OpStats {
        OpStats {
            lists_created: self.lists_created.load(Ordering::Relaxed),
            items_created: self.items_created.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_state() -> AppState {
        let config = Arc::new(ServerConfig {
            database_path: PathBuf::from(":memory:"),
            http_bind_address: "127.0.0.1:0".parse().expect("valid bind address"),
        });
        let store = Store::open_in_memory().expect("store opens");
        AppState::new(config, store).expect("templates compile")
    }

    #[test]
    fn templates_register_both_pages() {
        let state = test_state();
        let names: Vec<&str> = state.templates().get_template_names().collect();
        assert!(names.contains(&"home.html"));
        assert!(names.contains(&"list.html"));
    }

    #[test]
    fn op_stats_track_recorded_creations() {
        let state = test_state();
        assert_eq!(
            state.op_stats(),
            OpStats {
                lists_created: 0,
                items_created: 0
            }
        );

        state.record_list_created();
        state.record_item_created();
        state.record_item_created();

        let stats = state.op_stats();
        assert_eq!(stats.lists_created, 1);
        assert_eq!(stats.items_created, 2);
    }

    #[test]
    fn config_accessor_returns_shared_handle() {
        let state = test_state();
        let config = state.config();
        assert_eq!(config.database_path, PathBuf::from(":memory:"));
    }
}
