use thiserror::Error;

/// Errors surfaced by the scheduling engine and store.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid timestamp '{0}', expected yyyy-MM-dd HH:mm")]
    ParseTimestamp(String),

    #[error("invalid date '{0}', expected yyyy-MM-dd")]
    ParseDate(String),

    #[error("schedule item '{0}' not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),
}
