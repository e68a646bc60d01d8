//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::domains::feedback::workflow::{FeedbackWorkflow, WorkflowSettings};
use crate::kernel::{BaseExecutionBackend, HttpExecutionBackend, LocalExecutionBackend, ServerDeps};
use crate::server::graphql::{create_schema, GraphQLContext};
use crate::server::routes::{graphql_handler, health_handler, start_sync_execution_handler};

/// Headroom between the engine deadline and the HTTP request timeout, so a
/// timed-out execution is still reported as FAILED rather than cut off.
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub deps: Arc<ServerDeps>,
    pub workflow: Arc<FeedbackWorkflow>,
}

/// Build the Axum application router
///
/// Executions run in-process unless `WORKFLOW_ENDPOINT` points at a remote engine.
pub fn build_app(config: &Config, deps: ServerDeps) -> Result<Router> {
    // Create GraphQL schema (singleton)
    let schema = Arc::new(create_schema());

    let deps = Arc::new(deps);
    let workflow = Arc::new(FeedbackWorkflow::from_deps(
        &deps,
        WorkflowSettings::from_config(config),
    ));

    let request_timeout = config.execution_timeout + REQUEST_TIMEOUT_MARGIN;

    let execution_backend: Arc<dyn BaseExecutionBackend> = match &config.workflow_endpoint {
        Some(endpoint) => {
            info!("Executions are sent to remote engine at {}", endpoint);
            Arc::new(HttpExecutionBackend::new(endpoint.clone(), request_timeout)?)
        }
        None => {
            info!("Executions run in-process");
            Arc::new(LocalExecutionBackend::new(workflow.clone()))
        }
    };

    let context = GraphQLContext::new(
        deps.clone(),
        execution_backend,
        config.state_machine_arn.clone(),
    );
    let state = AxumAppState { deps, workflow };

    Ok(Router::new()
        .route("/graphql", post(graphql_handler))
        .route("/executions/sync", post(start_sync_execution_handler))
        .route("/health", get(health_handler))
        .layer(Extension(context))
        .layer(Extension(state))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            request_timeout,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(schema))
}
