use std::time::Duration;
use thiserror::Error;

/// Why an execution ended in the FAILED terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Classifier unavailable or input rejected; nothing was persisted
    #[error("Sentiment detection failed: {0}")]
    Classification(String),

    /// Store write failed after classification; no notification was sent
    #[error("Failed to record feedback: {0}")]
    Persistence(String),

    /// Notifier failed and the policy is to fail the execution
    #[error("Failed to notify customer support: {0}")]
    Notification(String),

    #[error("Execution timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// Engine fault (task panicked, impossible transition)
    #[error("Execution failed: {0}")]
    Runtime(String),
}

impl WorkflowError {
    /// Error name reported on the execution (`error` field).
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Classification(_) => "ClassificationError",
            Self::Persistence(_) => "PersistenceError",
            Self::Notification(_) => "NotificationError",
            Self::Timeout(_) => "States.Timeout",
            Self::Runtime(_) => "States.Runtime",
        }
    }
}
