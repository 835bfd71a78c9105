use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Invalid parameter '{0}': {1}")]
    InvalidParameter(String, String),
}
