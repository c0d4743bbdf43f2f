use crate::metrics::METRICS;
use crate::model::ListId;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

/// Error taxonomy for request handling.
///
/// Every variant maps to an HTTP status and a metrics category. Unknown list
/// ids are the only client-facing failure; everything else surfaces as a 500
/// without leaking internals to the response body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("list {0} not found")]
    ListNotFound(ListId),
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("template error: {0}")]
    Render(#[from] tera::Error),
    #[error("background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ListNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Render(_) | AppError::TaskJoin(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Classification used for error metrics labels.
    pub fn category(&self) -> &'static str {
        match self {
            AppError::ListNotFound(_) => "not_found",
            AppError::Storage(_) => "storage",
            AppError::Render(_) => "render",
            AppError::TaskJoin(_) => "internal",
        }
    }
}

const NOT_FOUND_BODY: &str =
    "<html><head><title>Not Found</title></head><body><h1>Not Found</h1></body></html>";
const SERVER_ERROR_BODY: &str =
    "<html><head><title>Server Error</title></head><body><h1>Server Error</h1></body></html>";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        METRICS.record_error(self.category());

        if status.is_server_error() {
            tracing::error!(error = %self, category = self.category(), "request failed");
        } else {
            tracing::debug!(error = %self, category = self.category(), "request rejected");
        }

        let body = if status == StatusCode::NOT_FOUND {
            NOT_FOUND_BODY
        } else {
            SERVER_ERROR_BODY
        };
        (status, Html(body)).into_response()
    }
}
