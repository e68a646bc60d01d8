// TestDependencies - mock implementations for testing
//
// Provides mock collaborators that can be injected into the workflow for tests.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    BaseFeedbackQueries, BaseFeedbackStore, BaseNotifier, BaseSentimentClassifier,
    InMemoryFeedbackStore, ServerDeps,
};
use crate::domains::feedback::models::{Feedback, Sentiment};
use crate::domains::feedback::notification::Notification;
use crate::domains::feedback::workflow::{FeedbackWorkflow, WorkflowSettings};

// =============================================================================
// Mock Sentiment Classifier
// =============================================================================

/// Returns queued results in order, then POSITIVE once the queue is empty.
#[derive(Clone, Default)]
pub struct MockClassifier {
    responses: Arc<Mutex<Vec<std::result::Result<Sentiment, String>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sentiment(self, sentiment: Sentiment) -> Self {
        self.responses.lock().unwrap().push(Ok(sentiment));
        self
    }

    /// Queue a raw label, e.g. one outside the known set
    pub fn with_label(self, label: &str) -> Self {
        self.with_sentiment(Sentiment::from_label(label))
    }

    pub fn with_error(self, message: &str) -> Self {
        self.responses.lock().unwrap().push(Err(message.to_string()));
        self
    }

    /// Sleep before answering (for deadline tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Texts the classifier was asked about
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseSentimentClassifier for MockClassifier {
    async fn detect_sentiment(&self, text: &str, _language_code: &str) -> Result<Sentiment> {
        self.calls.lock().unwrap().push(text.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                None
            } else {
                Some(responses.remove(0))
            }
        };

        match next {
            Some(Ok(sentiment)) => Ok(sentiment),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(Sentiment::Positive),
        }
    }
}

// =============================================================================
// Mock Feedback Store
// =============================================================================

/// In-memory store that records every write and can be told to fail.
#[derive(Clone, Default)]
pub struct MockFeedbackStore {
    inner: Arc<InMemoryFeedbackStore>,
    writes: Arc<Mutex<Vec<Feedback>>>,
    failure: Option<String>,
}

impl MockFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `put_feedback` fails with this message
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Attempted writes, including failed ones
    pub fn writes(&self) -> Vec<Feedback> {
        self.writes.lock().unwrap().clone()
    }

    pub fn stored_count(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl BaseFeedbackStore for MockFeedbackStore {
    async fn put_feedback(&self, feedback: &Feedback) -> Result<()> {
        self.writes.lock().unwrap().push(feedback.clone());

        if let Some(message) = &self.failure {
            anyhow::bail!("{}", message);
        }
        self.inner.put_feedback(feedback).await
    }
}

#[async_trait]
impl BaseFeedbackQueries for MockFeedbackStore {
    async fn get_feedback(&self, id: &str) -> Result<Option<Feedback>> {
        self.inner.get_feedback(id).await
    }

    async fn list_feedback(&self, limit: i64) -> Result<Vec<Feedback>> {
        self.inner.list_feedback(limit).await
    }
}

// =============================================================================
// Mock Notifier
// =============================================================================

#[derive(Clone, Default)]
pub struct MockNotifier {
    attempts: Arc<Mutex<Vec<Notification>>>,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Sleep before answering, to simulate a hung provider
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every publish attempt, delivered or not
    pub fn notifications(&self) -> Vec<Notification> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn notification_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl BaseNotifier for MockNotifier {
    async fn publish(&self, notification: &Notification) -> Result<()> {
        self.attempts.lock().unwrap().push(notification.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.failure {
            Some(message) => anyhow::bail!("{}", message),
            None => Ok(()),
        }
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub struct TestDependencies {
    pub classifier: Arc<MockClassifier>,
    pub store: Arc<MockFeedbackStore>,
    pub notifier: Arc<MockNotifier>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            classifier: Arc::new(MockClassifier::new()),
            store: Arc::new(MockFeedbackStore::new()),
            notifier: Arc::new(MockNotifier::new()),
        }
    }

    /// Set a mock classifier
    pub fn mock_classifier(mut self, classifier: MockClassifier) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Set a mock store
    pub fn mock_store(mut self, store: MockFeedbackStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    /// Set a mock notifier
    pub fn mock_notifier(mut self, notifier: MockNotifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Convert into ServerDeps; the mocks stay inspectable through `self`'s handles
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.classifier.clone(),
            self.store.clone(),
            self.store.clone(),
            self.notifier.clone(),
            None,
        )
    }

    pub fn into_workflow(self, settings: WorkflowSettings) -> FeedbackWorkflow {
        self.workflow(settings)
    }

    pub fn workflow(&self, settings: WorkflowSettings) -> FeedbackWorkflow {
        FeedbackWorkflow::from_deps(&self.server_deps(), settings)
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
