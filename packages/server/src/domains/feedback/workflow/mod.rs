//! Feedback sentiment workflow: a pure state machine plus the engine that drives it.

pub mod engine;
pub mod history;
pub mod machine;

pub use engine::{validate_input, ExecutionReport, FeedbackWorkflow, WorkflowSettings};
pub use history::{states_entered, ExecutionEvent, ExecutionHistory};
pub use machine::{
    NotificationFailurePolicy, StepEvent, WorkflowMachine, WorkflowState, CHOOSE_BRANCH,
    DETECT_SENTIMENT, NON_POSITIVE_RECEIVED, NOTIFY_SUPPORT, POSITIVE_RECEIVED, RECORD_FEEDBACK,
};
