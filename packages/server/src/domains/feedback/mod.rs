//! Feedback domain - sentiment workflow for customer feedback
//!
//! Architecture:
//!   GraphQL edge → gateway mapping → execution backend → workflow engine
//!   → {classifier, store, notifier}

pub mod data;
pub mod edges;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod notification;
pub mod workflow;

// Re-export commonly used types
pub use data::{Execution, ExecutionResult, ExecutionStatus, FeedbackData, WorkflowOutput};
pub use errors::WorkflowError;
pub use gateway::{GatewayError, StartSyncExecutionRequest, UpstreamResponse};
pub use models::{Feedback, Sentiment, SentimentOutcome};
pub use notification::Notification;
pub use workflow::{ExecutionReport, FeedbackWorkflow, WorkflowSettings};
