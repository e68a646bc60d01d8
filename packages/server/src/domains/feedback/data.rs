//! Wire and GraphQL types for executions and stored feedback.

use chrono::SecondsFormat;
use juniper::GraphQLObject;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::models::{Feedback, SentimentOutcome};

/// Terminal status of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Succeeded,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUCCEEDED" => Some(Self::Succeeded),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output document of a successful execution: `{"Sentiment": "POSITIVE" | "NON-POSITIVE"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowOutput {
    #[serde(rename = "Sentiment")]
    pub sentiment: SentimentOutcome,
}

impl WorkflowOutput {
    pub fn new(sentiment: SentimentOutcome) -> Self {
        Self { sentiment }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"Sentiment":"{}"}}"#, self.sentiment.as_str())
        })
    }
}

/// Typed view of an execution's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub output: Option<WorkflowOutput>,
}

impl ExecutionResult {
    pub fn succeeded(output: WorkflowOutput) -> Self {
        Self {
            status: ExecutionStatus::Succeeded,
            output: Some(output),
        }
    }

    pub fn failed() -> Self {
        Self {
            status: ExecutionStatus::Failed,
            output: None,
        }
    }
}

/// One workflow execution, as returned by `submitFeedback`.
///
/// `input` and `output` are JSON documents encoded as strings; callers parse
/// `output` themselves. Failed executions carry `error`/`cause` instead of output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, GraphQLObject)]
#[serde(rename_all = "camelCase")]
#[graphql(description = "A synchronous run of the feedback sentiment workflow")]
pub struct Execution {
    /// Execution name (unique per execution)
    pub name: String,

    /// SUCCEEDED or FAILED
    pub status: String,

    /// JSON-encoded workflow input, `{"input": "..."}`
    pub input: String,

    pub execution_arn: String,

    /// RFC 3339
    pub start_date: String,

    /// RFC 3339
    pub stop_date: String,

    /// JSON-encoded output, `{"Sentiment": "POSITIVE" | "NON-POSITIVE"}`
    #[serde(default)]
    pub output: Option<String>,

    /// Error name of a failed execution
    #[serde(default)]
    pub error: Option<String>,

    /// Human readable failure cause
    #[serde(default)]
    pub cause: Option<String>,
}

impl Execution {
    pub fn status(&self) -> Option<ExecutionStatus> {
        ExecutionStatus::parse(&self.status)
    }

    /// Parse `output` into its typed form.
    pub fn parsed_output(&self) -> Result<Option<WorkflowOutput>, serde_json::Error> {
        self.output
            .as_deref()
            .map(serde_json::from_str::<WorkflowOutput>)
            .transpose()
    }

    pub fn result(&self) -> ExecutionResult {
        match (self.status(), self.parsed_output()) {
            (Some(ExecutionStatus::Succeeded), Ok(Some(output))) => {
                ExecutionResult::succeeded(output)
            }
            _ => ExecutionResult::failed(),
        }
    }
}

/// Feedback GraphQL data type
#[derive(Debug, Clone, Serialize, Deserialize, GraphQLObject)]
#[serde(rename_all = "camelCase")]
#[graphql(name = "Feedback", description = "A recorded feedback submission")]
pub struct FeedbackData {
    pub id: String,
    pub content: String,
    /// Classifier label, verbatim
    pub sentiment: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Feedback> for FeedbackData {
    fn from(feedback: Feedback) -> Self {
        Self {
            id: feedback.id,
            content: feedback.content,
            sentiment: feedback.sentiment,
            created_at: feedback
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            updated_at: feedback
                .updated_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn execution(status: &str, output: Option<&str>) -> Execution {
        Execution {
            name: "n".into(),
            status: status.into(),
            input: r#"{"input":"hi"}"#.into(),
            execution_arn: "arn:n".into(),
            start_date: "2024-01-01T00:00:00.000Z".into(),
            stop_date: "2024-01-01T00:00:00.010Z".into(),
            output: output.map(str::to_string),
            error: None,
            cause: None,
        }
    }

    #[test]
    fn output_json_matches_wire_format() {
        assert_eq!(
            WorkflowOutput::new(SentimentOutcome::Positive).to_json(),
            r#"{"Sentiment":"POSITIVE"}"#
        );
        assert_eq!(
            WorkflowOutput::new(SentimentOutcome::NonPositive).to_json(),
            r#"{"Sentiment":"NON-POSITIVE"}"#
        );
    }

    #[test]
    fn result_reads_status_and_output() {
        let ok = execution("SUCCEEDED", Some(r#"{"Sentiment":"NON-POSITIVE"}"#));
        assert_eq!(
            ok.result(),
            ExecutionResult::succeeded(WorkflowOutput::new(SentimentOutcome::NonPositive))
        );

        let failed = execution("FAILED", None);
        assert_eq!(failed.result(), ExecutionResult::failed());
    }

    #[test]
    fn garbage_output_is_not_a_success() {
        let weird = execution("SUCCEEDED", Some("not json"));
        assert!(weird.parsed_output().is_err());
        assert_eq!(weird.result().status, ExecutionStatus::Failed);
    }

    #[test]
    fn execution_serializes_camel_case() {
        let json = serde_json::to_value(execution("SUCCEEDED", None)).unwrap();
        assert!(json.get("executionArn").is_some());
        assert!(json.get("startDate").is_some());
        assert!(json.get("stopDate").is_some());
    }
}
