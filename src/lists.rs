//! List operations behind the HTTP handlers.
//!
//! Store calls run on the blocking pool; the connection mutex must never be
//! held on a runtime thread.

use crate::error::AppError;
use crate::metrics::METRICS;
use crate::model::{Item, List, ListId};
use crate::state::AppState;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info};

/// Creates a new list with its first item and returns the list.
pub async fn create_list(state: &Arc<AppState>, text: String) -> Result<List, AppError> {
    let store = state.store().clone();
    let (list, item) =
        task::spawn_blocking(move || store.create_list_with_first_item(&text)).await??;

    state.record_list_created();
    state.record_item_created();
    METRICS.record_list_created();
    METRICS.record_item_created();

    info!(list_id = %list.id, item_id = %item.id, "list created");
    Ok(list)
}

/// Appends an item to an existing list and returns the list.
///
/// Unknown list ids surface as [`AppError::ListNotFound`] so the handler can
/// answer 404 instead of inserting an orphan.
pub async fn add_item(
    state: &Arc<AppState>,
    list_id: ListId,
    text: String,
) -> Result<List, AppError> {
    let store = state.store().clone();
    let inserted = task::spawn_blocking(move || store.insert_item(list_id, &text)).await??;

    match inserted {
        Some(item) => {
            state.record_item_created();
            METRICS.record_item_created();
            debug!(list_id = %list_id, item_id = %item.id, "item added");
            Ok(List { id: list_id })
        }
        None => Err(AppError::ListNotFound(list_id)),
    }
}

/// Fetches a list together with its items in display order.
pub async fn list_detail(
    state: &Arc<AppState>,
    list_id: ListId,
) -> Result<(List, Vec<Item>), AppError> {
    let store = state.store().clone();
    let detail = task::spawn_blocking(move || -> rusqlite::Result<Option<(List, Vec<Item>)>> {
        let Some(list) = store.get_list(list_id)? else {
            return Ok(None);
        };
        let items = store.items_for_list(list_id)?;
        Ok(Some((list, items)))
    })
    .await??;

    detail.ok_or(AppError::ListNotFound(list_id))
}
