//! Integration tests for the feedback workflow engine.
//!
//! Every test runs real executions over mock collaborators and checks the
//! execution envelope, the store, the notifier and the history.

use std::time::Duration;

use feedback_core::domains::feedback::data::{ExecutionStatus, WorkflowOutput};
use feedback_core::domains::feedback::models::{Sentiment, SentimentOutcome};
use feedback_core::domains::feedback::workflow::{
    states_entered, ExecutionEvent, NotificationFailurePolicy, WorkflowSettings, CHOOSE_BRANCH,
    DETECT_SENTIMENT, NON_POSITIVE_RECEIVED, NOTIFY_SUPPORT, POSITIVE_RECEIVED, RECORD_FEEDBACK,
};
use feedback_core::kernel::test_dependencies::{
    MockClassifier, MockFeedbackStore, MockNotifier, TestDependencies,
};
use feedback_core::kernel::BaseFeedbackQueries;

fn settings() -> WorkflowSettings {
    WorkflowSettings::default()
}

// =============================================================================
// Branching
// =============================================================================

#[tokio::test]
async fn positive_feedback_is_recorded_without_notification() {
    let deps = TestDependencies::new()
        .mock_classifier(MockClassifier::new().with_sentiment(Sentiment::Positive));
    let workflow = deps.workflow(settings());

    let report = workflow.execute("This is wonderful, thank you!").await;

    assert_eq!(report.execution.status, "SUCCEEDED");
    assert_eq!(
        report.execution.output.as_deref(),
        Some(r#"{"Sentiment":"POSITIVE"}"#)
    );
    assert_eq!(
        report.result.output,
        Some(WorkflowOutput::new(SentimentOutcome::Positive))
    );
    assert_eq!(deps.notifier.notification_count(), 0);
    assert_eq!(deps.store.stored_count(), 1);
    assert_eq!(
        states_entered(&report.history),
        vec![DETECT_SENTIMENT, RECORD_FEEDBACK, CHOOSE_BRANCH, POSITIVE_RECEIVED]
    );
}

#[tokio::test]
async fn negative_feedback_notifies_support_once() {
    let deps = TestDependencies::new()
        .mock_classifier(MockClassifier::new().with_sentiment(Sentiment::Negative));
    let workflow = deps.workflow(settings());

    let report = workflow.execute("This was terrible.").await;

    assert_eq!(report.result.status, ExecutionStatus::Succeeded);
    assert_eq!(
        report.execution.output.as_deref(),
        Some(r#"{"Sentiment":"NON-POSITIVE"}"#)
    );

    let notifications = deps.notifier.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].message, "Non-positive feedback detected.");
    assert_eq!(notifications[0].detected_sentiment, "NEGATIVE");
    assert_eq!(
        states_entered(&report.history),
        vec![
            DETECT_SENTIMENT,
            RECORD_FEEDBACK,
            CHOOSE_BRANCH,
            NOTIFY_SUPPORT,
            NON_POSITIVE_RECEIVED
        ]
    );
}

#[tokio::test]
async fn every_non_positive_label_escalates_with_that_label() {
    for label in ["NEGATIVE", "NEUTRAL", "MIXED", "positive", "SOMETHING_NEW"] {
        let deps =
            TestDependencies::new().mock_classifier(MockClassifier::new().with_label(label));
        let report = deps.workflow(settings()).execute("some feedback").await;

        assert_eq!(
            report.result.output,
            Some(WorkflowOutput::new(SentimentOutcome::NonPositive)),
            "label {}",
            label
        );
        let notifications = deps.notifier.notifications();
        assert_eq!(notifications.len(), 1, "label {}", label);
        assert_eq!(notifications[0].detected_sentiment, label);
    }
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn record_keeps_input_and_label_verbatim() {
    let text = "  Mixed bag:\n\"great\" staff, slow checkout  ";
    let deps = TestDependencies::new()
        .mock_classifier(MockClassifier::new().with_sentiment(Sentiment::Mixed));
    let report = deps.workflow(settings()).execute(text).await;

    let writes = deps.store.writes();
    assert_eq!(writes.len(), 1);
    let record = &writes[0];
    assert_eq!(record.content, text);
    assert_eq!(record.sentiment, "MIXED");
    assert_eq!(record.typename, "Feedback");
    assert_eq!(record.created_at, record.updated_at);
    assert_eq!(record.id, report.execution.execution_arn);

    let stored = deps.store.get_feedback(&record.id).await.unwrap();
    assert_eq!(stored.as_ref(), Some(record));

    let input: serde_json::Value = serde_json::from_str(&report.execution.input).unwrap();
    assert_eq!(input["input"], text);
}

#[tokio::test]
async fn identical_text_creates_a_new_record_each_time() {
    let deps = TestDependencies::new();
    let workflow = deps.workflow(settings());

    let first = workflow.execute("Same words").await;
    let second = workflow.execute("Same words").await;

    assert_ne!(first.execution.execution_arn, second.execution.execution_arn);
    assert_ne!(first.execution.name, second.execution.name);
    assert_eq!(deps.store.stored_count(), 2);
}

#[tokio::test]
async fn persistence_failure_fails_without_notifying() {
    let deps = TestDependencies::new()
        .mock_classifier(MockClassifier::new().with_sentiment(Sentiment::Negative))
        .mock_store(MockFeedbackStore::new().failing("connection reset"));

    let report = deps.workflow(settings()).execute("This was terrible.").await;

    assert_eq!(report.execution.status, "FAILED");
    assert_eq!(report.execution.output, None);
    assert_eq!(report.execution.error.as_deref(), Some("PersistenceError"));
    assert!(report
        .execution
        .cause
        .as_deref()
        .unwrap()
        .contains("connection reset"));
    assert_eq!(deps.notifier.notification_count(), 0);
    assert!(!states_entered(&report.history).contains(&NOTIFY_SUPPORT));
}

// =============================================================================
// Classification failures
// =============================================================================

#[tokio::test]
async fn classifier_failure_fails_before_any_write() {
    let deps = TestDependencies::new()
        .mock_classifier(MockClassifier::new().with_error("service unavailable"));

    let report = deps.workflow(settings()).execute("Hello there").await;

    assert_eq!(report.result.status, ExecutionStatus::Failed);
    assert_eq!(report.execution.error.as_deref(), Some("ClassificationError"));
    assert!(deps.store.writes().is_empty());
    assert_eq!(deps.notifier.notification_count(), 0);
    assert!(report.history.iter().any(|e| matches!(
        e,
        ExecutionEvent::TaskFailed { state, .. } if state == DETECT_SENTIMENT
    )));
}

#[tokio::test]
async fn blank_input_is_rejected_without_calling_classifier() {
    let deps = TestDependencies::new();
    let report = deps.workflow(settings()).execute("   \n ").await;

    assert_eq!(report.execution.status, "FAILED");
    assert_eq!(report.execution.error.as_deref(), Some("ClassificationError"));
    assert!(deps.classifier.calls().is_empty());
    assert!(deps.store.writes().is_empty());
}

#[tokio::test]
async fn oversize_input_is_rejected() {
    let deps = TestDependencies::new();
    let settings = WorkflowSettings {
        max_input_bytes: 10,
        ..settings()
    };
    let report = deps.workflow(settings).execute("this is longer than ten bytes").await;

    assert_eq!(report.execution.error.as_deref(), Some("ClassificationError"));
    assert!(report
        .execution
        .cause
        .as_deref()
        .unwrap()
        .contains("TextSizeLimitExceeded"));
    assert!(deps.store.writes().is_empty());
}

// =============================================================================
// Notification failures
// =============================================================================

#[tokio::test]
async fn notification_failure_is_best_effort_by_default() {
    let deps = TestDependencies::new()
        .mock_classifier(MockClassifier::new().with_sentiment(Sentiment::Neutral))
        .mock_notifier(MockNotifier::new().failing("topic unavailable"));

    let report = deps.workflow(settings()).execute("It was fine").await;

    assert_eq!(report.execution.status, "SUCCEEDED");
    assert_eq!(
        report.execution.output.as_deref(),
        Some(r#"{"Sentiment":"NON-POSITIVE"}"#)
    );
    assert_eq!(deps.notifier.notification_count(), 1);
    assert!(report.history.iter().any(|e| matches!(
        e,
        ExecutionEvent::NotificationSkipped { cause } if cause.contains("topic unavailable")
    )));
}

#[tokio::test]
async fn notification_failure_can_fail_the_execution() {
    let deps = TestDependencies::new()
        .mock_classifier(MockClassifier::new().with_sentiment(Sentiment::Negative))
        .mock_notifier(MockNotifier::new().failing("topic unavailable"));
    let settings = WorkflowSettings {
        notification_policy: NotificationFailurePolicy::FailExecution,
        ..settings()
    };

    let report = deps.workflow(settings).execute("Awful").await;

    assert_eq!(report.execution.status, "FAILED");
    assert_eq!(report.execution.error.as_deref(), Some("NotificationError"));
    // The record was already written
    assert_eq!(deps.store.stored_count(), 1);
}

#[tokio::test]
async fn hung_notifier_does_not_fail_a_best_effort_execution() {
    let deps = TestDependencies::new()
        .mock_classifier(MockClassifier::new().with_sentiment(Sentiment::Negative))
        .mock_notifier(MockNotifier::new().with_delay(Duration::from_secs(5)));
    let settings = WorkflowSettings {
        timeout: Duration::from_millis(200),
        ..settings()
    };

    let report = deps.workflow(settings).execute("This was terrible.").await;

    assert_eq!(report.execution.status, "SUCCEEDED");
    assert_eq!(
        report.execution.output.as_deref(),
        Some(r#"{"Sentiment":"NON-POSITIVE"}"#)
    );
    assert_eq!(deps.store.stored_count(), 1);
    assert!(report.history.iter().any(|e| matches!(
        e,
        ExecutionEvent::NotificationSkipped { cause } if cause.contains("timed out")
    )));
}

#[tokio::test]
async fn notify_timeout_bounds_the_notify_step() {
    let deps = TestDependencies::new()
        .mock_classifier(MockClassifier::new().with_sentiment(Sentiment::Mixed))
        .mock_notifier(MockNotifier::new().with_delay(Duration::from_secs(5)));
    let settings = WorkflowSettings {
        notify_timeout: Duration::from_millis(50),
        ..settings()
    };

    let started = std::time::Instant::now();
    let report = deps.workflow(settings).execute("Meh").await;

    assert_eq!(report.execution.status, "SUCCEEDED");
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(deps.notifier.notification_count(), 1);
}

#[tokio::test]
async fn hung_notifier_fails_when_policy_demands_it() {
    let deps = TestDependencies::new()
        .mock_classifier(MockClassifier::new().with_sentiment(Sentiment::Negative))
        .mock_notifier(MockNotifier::new().with_delay(Duration::from_secs(5)));
    let settings = WorkflowSettings {
        notify_timeout: Duration::from_millis(50),
        notification_policy: NotificationFailurePolicy::FailExecution,
        ..settings()
    };

    let report = deps.workflow(settings).execute("Awful").await;

    assert_eq!(report.execution.status, "FAILED");
    assert_eq!(report.execution.error.as_deref(), Some("NotificationError"));
}

// =============================================================================
// Deadline and envelope
// =============================================================================

#[tokio::test]
async fn slow_classifier_hits_the_deadline() {
    let deps = TestDependencies::new().mock_classifier(
        MockClassifier::new()
            .with_sentiment(Sentiment::Positive)
            .with_delay(Duration::from_millis(500)),
    );
    let settings = WorkflowSettings {
        timeout: Duration::from_millis(50),
        ..settings()
    };

    let report = deps.workflow(settings).execute("Hello").await;

    assert_eq!(report.execution.status, "FAILED");
    assert_eq!(report.execution.error.as_deref(), Some("States.Timeout"));
    assert_eq!(report.execution.output, None);
    assert!(deps.store.writes().is_empty());
}

#[tokio::test]
async fn execution_envelope_is_well_formed() {
    let deps = TestDependencies::new();
    let settings = settings();
    let arn = settings.state_machine_arn.clone();

    let report = deps.workflow(settings).execute("Nice").await;
    let execution = &report.execution;

    assert_eq!(execution.execution_arn, format!("{}:{}", arn, execution.name));
    let start = chrono::DateTime::parse_from_rfc3339(&execution.start_date).unwrap();
    let stop = chrono::DateTime::parse_from_rfc3339(&execution.stop_date).unwrap();
    assert!(stop >= start);
    assert!(matches!(
        report.history.first(),
        Some(ExecutionEvent::ExecutionStarted { .. })
    ));
    assert!(matches!(
        report.history.last(),
        Some(ExecutionEvent::ExecutionSucceeded { .. })
    ));
}

#[tokio::test]
async fn concurrent_executions_are_independent() {
    let deps = TestDependencies::new().mock_classifier(
        MockClassifier::new()
            .with_sentiment(Sentiment::Positive)
            .with_sentiment(Sentiment::Negative)
            .with_sentiment(Sentiment::Positive)
            .with_sentiment(Sentiment::Negative),
    );
    let workflow = deps.workflow(settings());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let workflow = workflow.clone();
            tokio::spawn(async move { workflow.execute(&format!("feedback {}", i)).await })
        })
        .collect();

    let mut positives = 0;
    for handle in handles {
        let report = handle.await.unwrap();
        assert_eq!(report.execution.status, "SUCCEEDED");
        if report.result.output == Some(WorkflowOutput::new(SentimentOutcome::Positive)) {
            positives += 1;
        }
    }

    assert_eq!(positives, 2);
    assert_eq!(deps.store.stored_count(), 4);
    assert_eq!(deps.notifier.notification_count(), 2);
}
