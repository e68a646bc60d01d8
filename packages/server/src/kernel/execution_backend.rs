//! Execution backends: how the API reaches the workflow engine.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domains::feedback::gateway::{
    parse_execution_input, GatewayError, StartSyncExecutionRequest, UpstreamResponse,
};
use crate::domains::feedback::workflow::FeedbackWorkflow;
use crate::kernel::BaseExecutionBackend;

/// Run one engine request against an in-process workflow.
///
/// Shared by the local backend and the `/executions/sync` route so both
/// reject malformed requests the same way.
pub async fn handle_start_sync_execution(
    workflow: &FeedbackWorkflow,
    request: StartSyncExecutionRequest,
) -> UpstreamResponse {
    let expected_arn = &workflow.settings().state_machine_arn;
    if let Some(arn) = request.state_machine_arn.as_deref() {
        if arn != expected_arn {
            return UpstreamResponse::rejected(
                400,
                "StateMachineDoesNotExist",
                format!("State Machine Does Not Exist: '{}'", arn),
            );
        }
    }

    let text = match parse_execution_input(&request.input) {
        Ok(text) => text,
        Err(message) => return UpstreamResponse::rejected(400, "InvalidExecutionInput", message),
    };

    let report = workflow.execute(&text).await;

    match serde_json::to_string(&report.execution) {
        Ok(body) => UpstreamResponse::ok(body),
        Err(e) => UpstreamResponse::rejected(500, "InternalServerError", e.to_string()),
    }
}

/// Executes in-process. Always answers; engine failures come back as FAILED executions.
#[derive(Clone)]
pub struct LocalExecutionBackend {
    workflow: Arc<FeedbackWorkflow>,
}

impl LocalExecutionBackend {
    pub fn new(workflow: Arc<FeedbackWorkflow>) -> Self {
        Self { workflow }
    }
}

#[async_trait]
impl BaseExecutionBackend for LocalExecutionBackend {
    async fn start_sync_execution(
        &self,
        request: StartSyncExecutionRequest,
    ) -> std::result::Result<UpstreamResponse, GatewayError> {
        Ok(handle_start_sync_execution(&self.workflow, request).await)
    }
}

/// Calls a remote engine's `POST /executions/sync`.
#[derive(Clone)]
pub struct HttpExecutionBackend {
    base_url: String,
    http_client: Arc<reqwest::Client>,
}

impl HttpExecutionBackend {
    /// `timeout` bounds the whole HTTP exchange and should exceed the engine's deadline.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build workflow HTTP client")?;

        Ok(Self {
            base_url: base_url.into(),
            http_client: Arc::new(http_client),
        })
    }

    pub fn executions_url(&self) -> String {
        format!("{}/executions/sync", self.base_url.trim_end_matches('/'))
    }
}

fn transport_error_type(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "TimeoutError"
    } else if error.is_connect() {
        "ConnectError"
    } else {
        "TransportError"
    }
}

#[async_trait]
impl BaseExecutionBackend for HttpExecutionBackend {
    async fn start_sync_execution(
        &self,
        request: StartSyncExecutionRequest,
    ) -> std::result::Result<UpstreamResponse, GatewayError> {
        let url = self.executions_url();
        debug!(url = %url, "Starting remote execution");

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Workflow engine unreachable");
                GatewayError::transport(transport_error_type(&e), e.to_string())
            })?;

        let status_code = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::transport(transport_error_type(&e), e.to_string()))?;

        Ok(UpstreamResponse { status_code, body })
    }
}
