use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use journal::JournalError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] core_types::CoreError),
    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),
    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Analytics(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Journal(err @ JournalError::InvalidRecord { .. }) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::Journal(JournalError::Csv(err)) => {
                (StatusCode::BAD_REQUEST, format!("Malformed CSV: {err}"))
            }
            AppError::Journal(journal_err) => {
                tracing::error!(error = ?journal_err, "Journal error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred while exporting".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
