// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// The workflow in domains/feedback/workflow decides what to call and when.
//
// Naming convention: Base* for trait names (e.g., BaseNotifier, BaseFeedbackStore)

use anyhow::Result;
use async_trait::async_trait;

use crate::domains::feedback::models::{Feedback, Sentiment};
use crate::domains::feedback::gateway::{GatewayError, StartSyncExecutionRequest, UpstreamResponse};
use crate::domains::feedback::notification::Notification;

// =============================================================================
// Sentiment Classifier Trait
// =============================================================================

#[async_trait]
pub trait BaseSentimentClassifier: Send + Sync {
    /// Detect the dominant sentiment of `text`.
    ///
    /// Unrecognised labels come back as `Sentiment::Other` rather than an error.
    async fn detect_sentiment(&self, text: &str, language_code: &str) -> Result<Sentiment>;
}

// =============================================================================
// Feedback Store Traits
// =============================================================================

/// Write side used by the workflow: exactly one put per execution.
#[async_trait]
pub trait BaseFeedbackStore: Send + Sync {
    async fn put_feedback(&self, feedback: &Feedback) -> Result<()>;
}

/// Read side used by GraphQL queries.
#[async_trait]
pub trait BaseFeedbackQueries: Send + Sync {
    async fn get_feedback(&self, id: &str) -> Result<Option<Feedback>>;

    /// Newest first
    async fn list_feedback(&self, limit: i64) -> Result<Vec<Feedback>>;
}

// =============================================================================
// Notifier Trait
// =============================================================================

#[async_trait]
pub trait BaseNotifier: Send + Sync {
    /// Deliver the notification to the configured subscriber.
    async fn publish(&self, notification: &Notification) -> Result<()>;
}

// =============================================================================
// Execution Backend Trait
// =============================================================================

/// Transport between the API and the workflow engine.
///
/// Implementations return the engine's raw `{statusCode, body}` reply; mapping it
/// into an execution is the gateway's job.
#[async_trait]
pub trait BaseExecutionBackend: Send + Sync {
    async fn start_sync_execution(
        &self,
        request: StartSyncExecutionRequest,
    ) -> std::result::Result<UpstreamResponse, GatewayError>;
}
