//! Feedback client: submits text to the API and decides what to show the user.
//!
//! `FeedbackForm` is the UI-independent part of the feedback page: it holds the
//! draft, calls the API, and lands in exactly one `FeedbackState`.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domains::feedback::data::{Execution, FeedbackData};
use crate::domains::feedback::models::SentimentOutcome;

pub const SUBMIT_FEEDBACK_MUTATION: &str = r#"mutation SubmitFeedback($input: String!) {
  submitFeedback(input: $input) {
    name
    status
    input
    executionArn
    startDate
    stopDate
    output
    error
    cause
  }
}"#;

pub const LIST_FEEDBACK_QUERY: &str = r#"query Feedbacks($limit: Int) {
  feedbacks(limit: $limit) {
    id
    content
    sentiment
    createdAt
    updatedAt
  }
}"#;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL error: {0}")]
    GraphQL(String),

    /// The execution finished without an output (it FAILED)
    #[error("Execution {status} without output ({})", .error.as_deref().unwrap_or("no error"))]
    MissingOutput {
        status: String,
        error: Option<String>,
    },

    #[error("Unreadable execution output: {0}")]
    InvalidOutput(String),
}

/// What the feedback page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackState {
    /// The empty form, no alert
    Form,
    Positive,
    Error,
    /// Any other output label; rendered with the "we'd like to make it right" copy
    Escalation(String),
}

impl FeedbackState {
    pub fn from_output_label(label: &str) -> Self {
        match label {
            "POSITIVE" => Self::Positive,
            other => Self::Escalation(other.to_string()),
        }
    }

    /// Read the state from an execution's `output`, `{"Sentiment": ...}`.
    pub fn from_execution(execution: &Execution) -> Result<Self, ClientError> {
        let output = execution
            .output
            .as_deref()
            .ok_or_else(|| ClientError::MissingOutput {
                status: execution.status.clone(),
                error: execution.error.clone(),
            })?;

        #[derive(Deserialize)]
        struct Output {
            #[serde(rename = "Sentiment")]
            sentiment: String,
        }

        let parsed: Output =
            serde_json::from_str(output).map_err(|e| ClientError::InvalidOutput(e.to_string()))?;
        Ok(Self::from_output_label(&parsed.sentiment))
    }

    pub fn heading(&self) -> Option<&'static str> {
        match self {
            Self::Form => None,
            Self::Positive => Some("Thank you!"),
            Self::Error => Some("Oops!"),
            Self::Escalation(_) => Some("Thank you for your feedback!"),
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Form => None,
            Self::Positive => Some("Your feedback has been recorded."),
            Self::Error => Some("Something went wrong. Please try again later."),
            Self::Escalation(_) => Some(
                "We are always looking to improve. If you felt your experience was not optimal, \
                 we would love to make things right. Follow the link below to schedule a \
                 call with our customer support team.",
            ),
        }
    }

    pub fn is_escalation_of(&self, outcome: SentimentOutcome) -> bool {
        matches!(self, Self::Escalation(label) if label == outcome.as_str())
    }
}

/// The one API call the form needs.
#[async_trait]
pub trait FeedbackApi: Send + Sync {
    async fn submit_feedback(&self, text: &str) -> Result<Execution, ClientError>;
}

/// Draft text plus the state currently shown.
#[derive(Debug, Clone)]
pub struct FeedbackForm {
    draft: String,
    state: FeedbackState,
}

impl FeedbackForm {
    pub fn new() -> Self {
        Self {
            draft: String::new(),
            state: FeedbackState::Form,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn state(&self) -> &FeedbackState {
        &self.state
    }

    /// Close the alert and return to the form.
    pub fn dismiss(&mut self) {
        self.state = FeedbackState::Form;
    }

    /// Submit the draft. The draft is cleared only when a result is shown.
    pub async fn submit(&mut self, api: &dyn FeedbackApi) -> &FeedbackState {
        let outcome = api
            .submit_feedback(&self.draft)
            .await
            .and_then(|execution| FeedbackState::from_execution(&execution));

        match outcome {
            Ok(state) => {
                self.draft.clear();
                self.state = state;
            }
            Err(e) => {
                warn!(error = %e, "Feedback submission failed");
                self.state = FeedbackState::Error;
            }
        }
        &self.state
    }
}

impl Default for FeedbackForm {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct GraphQLErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct GraphQLResponseBody {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphQLErrorBody>>,
}

/// GraphQL-over-HTTP client for the feedback API.
#[derive(Clone)]
pub struct FeedbackClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl FeedbackClient {
    /// `endpoint` is the full GraphQL URL, e.g. `http://localhost:8080/graphql`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub async fn list_feedback(&self, limit: Option<i32>) -> Result<Vec<FeedbackData>, ClientError> {
        self.request(
            LIST_FEEDBACK_QUERY,
            serde_json::json!({ "limit": limit }),
            "feedbacks",
        )
        .await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
        field: &str,
    ) -> Result<T, ClientError> {
        debug!(endpoint = %self.endpoint, field, "GraphQL request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let parsed: GraphQLResponseBody = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) => {
                return Err(ClientError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        };

        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(ClientError::GraphQL(messages.join("; ")));
        }

        let value = parsed
            .data
            .and_then(|mut data| data.get_mut(field).map(serde_json::Value::take))
            .ok_or_else(|| ClientError::GraphQL(format!("response has no '{}' field", field)))?;

        serde_json::from_value(value).map_err(|e| ClientError::InvalidOutput(e.to_string()))
    }
}

#[async_trait]
impl FeedbackApi for FeedbackClient {
    async fn submit_feedback(&self, text: &str) -> Result<Execution, ClientError> {
        self.request(
            SUBMIT_FEEDBACK_MUTATION,
            serde_json::json!({ "input": text }),
            "submitFeedback",
        )
        .await
    }
}
