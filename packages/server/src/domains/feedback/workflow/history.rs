use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

/// One entry in an execution's event history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ExecutionEvent {
    ExecutionStarted { input: String },
    StateEntered { name: String },
    StateExited { name: String },
    TaskFailed {
        state: String,
        error: String,
        cause: String,
    },
    /// Notification failed under the best-effort policy
    NotificationSkipped { cause: String },
    ExecutionSucceeded { output: String },
    ExecutionFailed { error: String, cause: String },
}

/// Append-only history shared between the caller and the execution task.
#[derive(Debug, Clone, Default)]
pub struct ExecutionHistory {
    events: Arc<Mutex<Vec<ExecutionEvent>>>,
}

impl ExecutionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: ExecutionEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub fn state_entered(&self, name: &str) {
        self.record(ExecutionEvent::StateEntered {
            name: name.to_string(),
        });
    }

    pub fn state_exited(&self, name: &str) {
        self.record(ExecutionEvent::StateExited {
            name: name.to_string(),
        });
    }

    pub fn snapshot(&self) -> Vec<ExecutionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Names of the states an execution entered, in order.
pub fn states_entered(events: &[ExecutionEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            ExecutionEvent::StateEntered { name } => Some(name.as_str()),
            _ => None,
        })
        .collect()
}
