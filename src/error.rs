use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    /// A date or time string from a source record did not parse
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// End time before start time
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    pub fn invalid_time(input: &str) -> Self {
        PlannerError::InvalidFormat(format!("expected HH:MM, got {:?}", input))
    }

    /// Errors a render recovers from locally (skip the record or floor the size)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PlannerError::InvalidFormat(_) | PlannerError::InvalidRange(_))
    }
}
