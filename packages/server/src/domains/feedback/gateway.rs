//! Request/response mapping between the GraphQL API and the workflow engine.
//!
//! The API never talks to the engine directly: it builds a
//! `StartSyncExecutionRequest`, hands it to an execution backend, and maps the
//! backend's `{statusCode, body}` reply back into an `Execution` or an error.

use juniper::{FieldError, Object, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::data::Execution;

/// Body of `POST /executions/sync`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSyncExecutionRequest {
    /// Defaults to the engine's own state machine when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_machine_arn: Option<String>,
    /// JSON document `{"input": "<text>"}`, encoded as a string
    pub input: String,
}

/// Raw reply from the engine: HTTP status plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status_code: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn ok(body: String) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    /// Engine-side rejection, `{"__type": ..., "message": ...}`.
    pub fn rejected(status_code: u16, error_type: &str, message: impl Into<String>) -> Self {
        Self {
            status_code,
            body: serde_json::json!({ "__type": error_type, "message": message.into() })
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The engine could not be reached or the request never completed
    #[error("{message}")]
    Transport { message: String, error_type: String },

    /// The engine answered with a non-200 status; the message is its body
    #[error("{body}")]
    Upstream { status_code: u16, body: String },

    /// A 200 reply whose body is not an execution
    #[error("Invalid execution response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn transport(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            error_type: error_type.into(),
        }
    }

    /// Convert into a GraphQL field error with `errorType` or `statusCode` extensions.
    pub fn into_field_error(self) -> FieldError {
        let mut extensions = Object::with_capacity(1);
        match &self {
            Self::Transport { error_type, .. } => {
                extensions.add_field("errorType", Value::scalar(error_type.clone()));
            }
            Self::Upstream { status_code, .. } => {
                extensions.add_field("statusCode", Value::scalar(i32::from(*status_code)));
            }
            Self::Decode(_) => {
                extensions.add_field("errorType", Value::scalar("MappingTemplate".to_string()));
            }
        }
        FieldError::new(self.to_string(), Value::Object(extensions))
    }
}

/// Wrap feedback text as the engine's input document.
///
/// JSON encoding escapes quotes, newlines and control characters; the text
/// itself is passed through unchanged.
pub fn map_request(state_machine_arn: &str, text: &str) -> StartSyncExecutionRequest {
    StartSyncExecutionRequest {
        state_machine_arn: Some(state_machine_arn.to_string()),
        input: serde_json::json!({ "input": text }).to_string(),
    }
}

/// Map the engine's reply into the API result.
pub fn map_response(
    response: Result<UpstreamResponse, GatewayError>,
) -> Result<Execution, GatewayError> {
    let response = response?;
    if response.status_code != 200 {
        return Err(GatewayError::Upstream {
            status_code: response.status_code,
            body: response.body,
        });
    }
    serde_json::from_str(&response.body).map_err(|e| GatewayError::Decode(e.to_string()))
}

#[derive(Deserialize)]
struct InputDocument {
    input: String,
}

/// Extract the feedback text from an input document.
pub fn parse_execution_input(input: &str) -> Result<String, String> {
    serde_json::from_str::<InputDocument>(input)
        .map(|doc| doc.input)
        .map_err(|e| format!("Input must be a JSON object with a string 'input' field: {}", e))
}
