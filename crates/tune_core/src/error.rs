use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TuningError {
    #[error("Unknown control code: {0} (expected 1..=8)")]
    UnknownControlCode(i64),

    #[error("Unknown control command: {0}")]
    UnknownCommand(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Non-positive field width: {0}")]
    NonPositiveWidth(f64),

    #[error("Unsupported schema version: found {found}, expected {expected}")]
    SchemaVersion { found: u8, expected: u8 },

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TuningError {
    /// Mistakes made by whoever called into the engine, as opposed to
    /// failures of the environment (files, parsing).
    pub fn is_caller_error(&self) -> bool {
        match self {
            TuningError::UnknownControlCode(_) => true,
            TuningError::UnknownCommand(_) => true,
            TuningError::SchemaVersion { .. } => true,
            TuningError::SessionNotFound(_) => true,
            TuningError::InvalidConfig(_) => true,
            TuningError::NonPositiveWidth(_) => false,
            TuningError::Json(_) => false,
            TuningError::Yaml(_) => false,
            TuningError::Io(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TuningError>;
