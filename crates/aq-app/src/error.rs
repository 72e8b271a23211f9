//! Error types for the aq-app service layer.

use std::path::PathBuf;

use aq_graph::LinearizeError;

use crate::engine::EngineError;

/// Application error type that wraps errors from the backend crates and
/// provides one error interface for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read flowsheet file: {path}")]
    FlowsheetRead {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },

    #[error("Flowsheet validation failed: {0}")]
    Validation(String),

    #[error("Invalid process train: {0}")]
    Topology(#[from] LinearizeError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for aq-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<aq_project::ProjectError> for AppError {
    fn from(err: aq_project::ProjectError) -> Self {
        match err {
            aq_project::ProjectError::Validation(v) => AppError::Validation(v.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<aq_project::ValidationError> for AppError {
    fn from(err: aq_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<aq_results::ResultsError> for AppError {
    fn from(err: aq_results::ResultsError) -> Self {
        match err {
            aq_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Results(format!("JSON error: {}", err))
    }
}
