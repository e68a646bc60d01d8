//! Synchronous execution of the feedback sentiment workflow.
//!
//! `FeedbackWorkflow::execute` runs one submission to a terminal state and
//! returns the execution envelope. Each execution runs on its own tokio task
//! under an end-to-end deadline; the caller awaits the outcome.

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use super::history::{ExecutionEvent, ExecutionHistory};
use super::machine::{NotificationFailurePolicy, StepEvent, WorkflowMachine, WorkflowState};
use crate::common::ExecutionId;
use crate::config::{Config, DEFAULT_STATE_MACHINE_ARN};
use crate::domains::feedback::data::{Execution, ExecutionResult, ExecutionStatus};
use crate::domains::feedback::errors::WorkflowError;
use crate::domains::feedback::models::Feedback;
use crate::domains::feedback::notification::Notification;
use crate::kernel::{BaseFeedbackStore, BaseNotifier, BaseSentimentClassifier, ServerDeps};

const NOTIFY_DEADLINE_MARGIN: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub state_machine_arn: String,
    pub timeout: Duration,
    /// Budget for publishing the support notification
    pub notify_timeout: Duration,
    /// UTF-8 byte limit accepted by the classifier
    pub max_input_bytes: usize,
    pub language_code: String,
    pub notification_policy: NotificationFailurePolicy,
}

impl WorkflowSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            state_machine_arn: config.state_machine_arn.clone(),
            timeout: config.execution_timeout,
            notify_timeout: config.notify_timeout,
            max_input_bytes: config.max_input_bytes,
            language_code: config.language_code.clone(),
            notification_policy: config.notification_failure_policy,
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            state_machine_arn: DEFAULT_STATE_MACHINE_ARN.to_string(),
            timeout: Duration::from_secs(30),
            notify_timeout: Duration::from_secs(5),
            max_input_bytes: 5000,
            language_code: "en".to_string(),
            notification_policy: NotificationFailurePolicy::BestEffort,
        }
    }
}

/// Everything an in-process execution produced.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub execution: Execution,
    pub result: ExecutionResult,
    pub history: Vec<ExecutionEvent>,
}

#[derive(Clone)]
pub struct FeedbackWorkflow {
    classifier: Arc<dyn BaseSentimentClassifier>,
    store: Arc<dyn BaseFeedbackStore>,
    notifier: Arc<dyn BaseNotifier>,
    machine: WorkflowMachine,
    settings: Arc<WorkflowSettings>,
}

impl FeedbackWorkflow {
    pub fn new(
        classifier: Arc<dyn BaseSentimentClassifier>,
        store: Arc<dyn BaseFeedbackStore>,
        notifier: Arc<dyn BaseNotifier>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            classifier,
            store,
            notifier,
            machine: WorkflowMachine::new(settings.notification_policy),
            settings: Arc::new(settings),
        }
    }

    pub fn from_deps(deps: &ServerDeps, settings: WorkflowSettings) -> Self {
        Self::new(
            deps.classifier.clone(),
            deps.feedback_store.clone(),
            deps.notifier.clone(),
            settings,
        )
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    /// Run one submission through the workflow.
    ///
    /// Never returns an error: failures are reported as a FAILED execution.
    pub async fn execute(&self, input: &str) -> ExecutionReport {
        let id = ExecutionId::new();
        let name = id.to_string();
        let execution_arn = format!("{}:{}", self.settings.state_machine_arn, name);
        let start_date = Utc::now();

        let history = ExecutionHistory::new();
        history.record(ExecutionEvent::ExecutionStarted {
            input: input.to_string(),
        });
        info!(execution_arn = %execution_arn, "Execution started");

        let timeout = self.settings.timeout;
        let deadline = Instant::now() + timeout;
        let run = Run {
            workflow: self.clone(),
            execution_arn: execution_arn.clone(),
            input: input.to_string(),
            history: history.clone(),
            deadline,
        };

        // The spawned task finishes (or hits its deadline) even if the caller goes away
        let handle =
            tokio::spawn(async move { tokio::time::timeout_at(deadline, run.drive()).await });

        let terminal = match handle.await {
            Ok(Ok(state)) => state,
            Ok(Err(_elapsed)) => {
                warn!(execution_arn = %execution_arn, "Execution timed out");
                WorkflowState::Failed {
                    error: WorkflowError::Timeout(timeout),
                }
            }
            Err(join_error) => WorkflowState::Failed {
                error: WorkflowError::Runtime(join_error.to_string()),
            },
        };

        let execution = finish(
            name,
            input,
            &execution_arn,
            start_date,
            Utc::now(),
            &terminal,
            &history,
        );

        ExecutionReport {
            result: execution.result(),
            execution,
            history: history.snapshot(),
        }
    }
}

fn format_date(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn finish(
    name: String,
    input: &str,
    execution_arn: &str,
    start_date: DateTime<Utc>,
    stop_date: DateTime<Utc>,
    terminal: &WorkflowState,
    history: &ExecutionHistory,
) -> Execution {
    let mut execution = Execution {
        name,
        status: ExecutionStatus::Failed.to_string(),
        input: serde_json::json!({ "input": input }).to_string(),
        execution_arn: execution_arn.to_string(),
        start_date: format_date(start_date),
        stop_date: format_date(stop_date),
        output: None,
        error: None,
        cause: None,
    };

    match (terminal, terminal.output()) {
        (_, Some(output)) => {
            let output = output.to_json();
            history.record(ExecutionEvent::ExecutionSucceeded {
                output: output.clone(),
            });
            info!(execution_arn = %execution_arn, output = %output, "Execution succeeded");
            execution.status = ExecutionStatus::Succeeded.to_string();
            execution.output = Some(output);
        }
        (WorkflowState::Failed { error }, None) => {
            record_failure(history, execution_arn, error);
            execution.error = Some(error.error_type().to_string());
            execution.cause = Some(error.to_string());
        }
        (state, None) => {
            let error = WorkflowError::Runtime(format!("stopped in state '{}'", state.name()));
            record_failure(history, execution_arn, &error);
            execution.error = Some(error.error_type().to_string());
            execution.cause = Some(error.to_string());
        }
    }

    execution
}

fn record_failure(history: &ExecutionHistory, execution_arn: &str, error: &WorkflowError) {
    history.record(ExecutionEvent::ExecutionFailed {
        error: error.error_type().to_string(),
        cause: error.to_string(),
    });
    warn!(
        execution_arn = %execution_arn,
        error = error.error_type(),
        cause = %error,
        "Execution failed"
    );
}

/// One execution in flight.
struct Run {
    workflow: FeedbackWorkflow,
    execution_arn: String,
    input: String,
    history: ExecutionHistory,
    deadline: Instant,
}

impl Run {
    async fn drive(self) -> WorkflowState {
        let machine = self.workflow.machine;
        let mut state = WorkflowState::DetectSentiment;

        while !state.is_terminal() {
            self.history.state_entered(state.name());

            let event = self.step(&state).await;
            let next = machine.decide(&state, event.clone());

            match (&event, &next) {
                (StepEvent::StepFailed(error), _) => {
                    self.history.record(ExecutionEvent::TaskFailed {
                        state: state.name().to_string(),
                        error: error.error_type().to_string(),
                        cause: error.to_string(),
                    });
                }
                (StepEvent::NotificationFailed(cause), WorkflowState::Failed { error }) => {
                    self.history.record(ExecutionEvent::TaskFailed {
                        state: state.name().to_string(),
                        error: error.error_type().to_string(),
                        cause: cause.clone(),
                    });
                }
                (StepEvent::NotificationFailed(cause), _) => {
                    warn!(
                        execution_arn = %self.execution_arn,
                        cause = %cause,
                        "Support notification failed; continuing"
                    );
                    self.history.record(ExecutionEvent::NotificationSkipped {
                        cause: cause.clone(),
                    });
                }
                _ => {}
            }

            self.history.state_exited(state.name());
            info!(
                execution_arn = %self.execution_arn,
                from = state.name(),
                to = next.name(),
                "State transition"
            );
            state = next;
        }

        if state.output().is_some() {
            self.history.state_entered(state.name());
            self.history.state_exited(state.name());
        }

        state
    }

    async fn step(&self, state: &WorkflowState) -> StepEvent {
        let settings = &self.workflow.settings;

        match state {
            WorkflowState::DetectSentiment => {
                if let Err(error) = validate_input(&self.input, settings.max_input_bytes) {
                    return StepEvent::StepFailed(error);
                }
                match self
                    .workflow
                    .classifier
                    .detect_sentiment(&self.input, &settings.language_code)
                    .await
                {
                    Ok(sentiment) => {
                        info!(
                            execution_arn = %self.execution_arn,
                            sentiment = %sentiment,
                            "Sentiment detected"
                        );
                        StepEvent::SentimentDetected(sentiment)
                    }
                    Err(e) => StepEvent::StepFailed(WorkflowError::Classification(format!("{:#}", e))),
                }
            }

            WorkflowState::RecordFeedback { sentiment } => {
                let feedback = Feedback::new(&self.execution_arn, &self.input, sentiment, Utc::now());
                match self.workflow.store.put_feedback(&feedback).await {
                    Ok(()) => StepEvent::FeedbackRecorded,
                    Err(e) => StepEvent::StepFailed(WorkflowError::Persistence(format!("{:#}", e))),
                }
            }

            WorkflowState::ChooseBranch { .. } => StepEvent::ChoiceEvaluated,

            WorkflowState::NotifySupport { sentiment } => {
                let notification = Notification::non_positive(sentiment);
                // Must expire before the execution deadline so the run can still finish
                let started = Instant::now();
                let notify_deadline = (started + settings.notify_timeout)
                    .min(self.deadline - NOTIFY_DEADLINE_MARGIN)
                    .max(started);
                let publish = self.workflow.notifier.publish(&notification);
                match tokio::time::timeout_at(notify_deadline, publish).await {
                    Ok(Ok(())) => StepEvent::NotificationPublished,
                    Ok(Err(e)) => StepEvent::NotificationFailed(format!("{:#}", e)),
                    Err(_elapsed) => StepEvent::NotificationFailed(format!(
                        "notifier timed out after {:?}",
                        notify_deadline.saturating_duration_since(started)
                    )),
                }
            }

            terminal => StepEvent::StepFailed(WorkflowError::Runtime(format!(
                "no step for terminal state '{}'",
                terminal.name()
            ))),
        }
    }
}

/// Reject input the classifier would refuse before calling it.
pub fn validate_input(input: &str, max_bytes: usize) -> Result<(), WorkflowError> {
    if input.trim().is_empty() {
        return Err(WorkflowError::Classification(
            "input text must not be empty".to_string(),
        ));
    }
    if input.len() > max_bytes {
        return Err(WorkflowError::Classification(format!(
            "TextSizeLimitExceeded: input is {} bytes, the limit is {} bytes",
            input.len(),
            max_bytes
        )));
    }
    Ok(())
}
