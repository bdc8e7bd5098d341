//! Worker Error Types

use thiserror::Error;

/// Result type for worker operations
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors from task submission
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// The worker has not been started (or was stopped)
    #[error("Worker is not running - cannot submit task")]
    NotRunning,

    /// The worker shut down while the submission was in flight
    #[error("Worker stopped - task rejected")]
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_error_display() {
        assert_eq!(
            WorkerError::NotRunning.to_string(),
            "Worker is not running - cannot submit task"
        );
        assert_eq!(WorkerError::Stopped.to_string(), "Worker stopped - task rejected");
    }
}
