use serde::Serialize;
use thiserror::Error;

use crate::notify::NotifyError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("db error: {0}")]
    Db(#[from] monitor_db::DbError),
    #[error("ingest error: {0}")]
    Ingest(#[from] ingest::IngestError),
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{0}")]
    InvalidRange(#[from] monitor_core::RangeError),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    ConfigurationMissing(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let (status, code) = match err {
            AppError::InvalidInput(_) => (400, Some("invalid_input".to_string())),
            AppError::InvalidRange(_) => (400, Some("invalid_range".to_string())),
            AppError::ConfigurationMissing(_) => {
                (412, Some("configuration_missing".to_string()))
            }
            AppError::Db(_)
            | AppError::Ingest(_)
            | AppError::Notify(_)
            | AppError::Io(_)
            | AppError::Serde(_)
            | AppError::Toml(_)
            | AppError::Message(_) => (500, None),
        };
        Self {
            status,
            message: err.to_string(),
            code,
        }
    }
}
