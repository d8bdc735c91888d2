//! Automation error types

use thiserror::Error;

/// Automation workspace errors
#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("pulumi not found. Please install: curl -fsSL https://get.pulumi.com | sh")]
    PulumiNotFound,

    #[error("pulumi {command} failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Invalid program: {0}")]
    InvalidProgram(String),

    #[error("Stack output not found: {0}")]
    MissingOutput(String),

    #[error("Stack history is empty: {0}")]
    HistoryUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, AutomationError>;
