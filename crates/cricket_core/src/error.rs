use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scoring config: {0}")]
    InvalidConfig(String),

    #[error("Unsupported document shape: {0}")]
    UnsupportedDocument(String),
}

impl StatsError {
    /// Whether the run can carry on past this error (skip the input and continue).
    pub fn is_recoverable(&self) -> bool {
        match self {
            StatsError::Json(_) => true,
            StatsError::UnsupportedDocument(_) => true,
            StatsError::Read { .. } => true,
            StatsError::InvalidConfig(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
