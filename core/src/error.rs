use thiserror::Error;

use crate::types::ScenarioId;

#[derive(Error, Debug)]
pub enum RoiError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Scenario {id} not found")]
    ScenarioNotFound { id: ScenarioId },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RoiError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation { field, reason: reason.into() }
    }

    /// True when the caller can fix the request and retry.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::ScenarioNotFound { .. })
    }
}

pub type RoiResult<T> = Result<T, RoiError>;
