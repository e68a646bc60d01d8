//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod execution_backend;
pub mod notifier;
pub mod sentiment;
pub mod store;
pub mod test_dependencies;
pub mod traits;

pub use deps::{create_classifier, create_notifier, ServerDeps};
pub use execution_backend::{
    handle_start_sync_execution, HttpExecutionBackend, LocalExecutionBackend,
};
pub use notifier::{LogNotifier, TwilioNotifier, WebhookNotifier};
pub use sentiment::{LexiconClassifier, OpenAiSentimentClassifier};
pub use store::{InMemoryFeedbackStore, PostgresFeedbackStore};
pub use test_dependencies::TestDependencies;
pub use traits::*;
