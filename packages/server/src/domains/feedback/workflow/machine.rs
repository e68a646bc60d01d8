use anyhow::bail;
use std::str::FromStr;

use crate::domains::feedback::data::WorkflowOutput;
use crate::domains::feedback::errors::WorkflowError;
use crate::domains::feedback::models::{Sentiment, SentimentOutcome};

pub const DETECT_SENTIMENT: &str = "Detect feedback sentiment";
pub const RECORD_FEEDBACK: &str = "Record feedback and sentiment";
pub const CHOOSE_BRANCH: &str = "Positive or non-positive sentiment?";
pub const NOTIFY_SUPPORT: &str = "Notify customer support";
pub const NON_POSITIVE_RECEIVED: &str = "Non-positive feedback received";
pub const POSITIVE_RECEIVED: &str = "Positive feedback received";
pub const FAILED: &str = "Failed";

/// What happens when the support notification cannot be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationFailurePolicy {
    /// Log, record the skip in history, and still succeed
    #[default]
    BestEffort,
    /// End the execution as FAILED with a NotificationError
    FailExecution,
}

impl NotificationFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BestEffort => "best_effort",
            Self::FailExecution => "fail_execution",
        }
    }
}

impl FromStr for NotificationFailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "best_effort" => Ok(Self::BestEffort),
            "fail_execution" => Ok(Self::FailExecution),
            other => bail!(
                "Unknown notification failure policy '{}' (expected best_effort or fail_execution)",
                other
            ),
        }
    }
}

/// Position of an execution in the workflow graph.
///
/// `DetectSentiment -> RecordFeedback -> ChooseBranch -> {PositiveReceived |
/// NotifySupport -> NonPositiveReceived}`, with `Failed` reachable from any task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    DetectSentiment,
    RecordFeedback { sentiment: Sentiment },
    ChooseBranch { sentiment: Sentiment },
    NotifySupport { sentiment: Sentiment },
    PositiveReceived,
    NonPositiveReceived,
    Failed { error: WorkflowError },
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DetectSentiment => DETECT_SENTIMENT,
            Self::RecordFeedback { .. } => RECORD_FEEDBACK,
            Self::ChooseBranch { .. } => CHOOSE_BRANCH,
            Self::NotifySupport { .. } => NOTIFY_SUPPORT,
            Self::PositiveReceived => POSITIVE_RECEIVED,
            Self::NonPositiveReceived => NON_POSITIVE_RECEIVED,
            Self::Failed { .. } => FAILED,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::PositiveReceived | Self::NonPositiveReceived | Self::Failed { .. }
        )
    }

    /// Output document of a successful terminal state.
    pub fn output(&self) -> Option<WorkflowOutput> {
        match self {
            Self::PositiveReceived => Some(WorkflowOutput::new(SentimentOutcome::Positive)),
            Self::NonPositiveReceived => Some(WorkflowOutput::new(SentimentOutcome::NonPositive)),
            _ => None,
        }
    }
}

/// Result of running the step for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    SentimentDetected(Sentiment),
    FeedbackRecorded,
    ChoiceEvaluated,
    NotificationPublished,
    NotificationFailed(String),
    StepFailed(WorkflowError),
}

/// Workflow state machine - pure decision logic
///
/// Given the current state and what its step produced, decides the next state.
/// Performs no IO.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowMachine {
    policy: NotificationFailurePolicy,
}

impl WorkflowMachine {
    pub fn new(policy: NotificationFailurePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> NotificationFailurePolicy {
        self.policy
    }

    pub fn decide(&self, state: &WorkflowState, event: StepEvent) -> WorkflowState {
        match (state, event) {
            // Terminal states absorb nothing
            (s, event) if s.is_terminal() => WorkflowState::Failed {
                error: WorkflowError::Runtime(format!(
                    "{:?} received after terminal state '{}'",
                    event,
                    s.name()
                )),
            },

            // Any task failure ends the execution; remaining steps never run
            (_, StepEvent::StepFailed(error)) => WorkflowState::Failed { error },

            (WorkflowState::DetectSentiment, StepEvent::SentimentDetected(sentiment)) => {
                WorkflowState::RecordFeedback { sentiment }
            }

            (WorkflowState::RecordFeedback { sentiment }, StepEvent::FeedbackRecorded) => {
                WorkflowState::ChooseBranch {
                    sentiment: sentiment.clone(),
                }
            }

            // Only an exact POSITIVE skips the escalation branch
            (WorkflowState::ChooseBranch { sentiment }, StepEvent::ChoiceEvaluated) => {
                match sentiment.outcome() {
                    SentimentOutcome::Positive => WorkflowState::PositiveReceived,
                    SentimentOutcome::NonPositive => WorkflowState::NotifySupport {
                        sentiment: sentiment.clone(),
                    },
                }
            }

            (WorkflowState::NotifySupport { .. }, StepEvent::NotificationPublished) => {
                WorkflowState::NonPositiveReceived
            }

            (WorkflowState::NotifySupport { .. }, StepEvent::NotificationFailed(cause)) => {
                match self.policy {
                    NotificationFailurePolicy::BestEffort => WorkflowState::NonPositiveReceived,
                    NotificationFailurePolicy::FailExecution => WorkflowState::Failed {
                        error: WorkflowError::Notification(cause),
                    },
                }
            }

            (state, event) => WorkflowState::Failed {
                error: WorkflowError::Runtime(format!(
                    "{:?} is not valid in state '{}'",
                    event,
                    state.name()
                )),
            },
        }
    }
}
