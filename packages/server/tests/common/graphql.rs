//! GraphQL client for integration testing.
//!
//! Executes GraphQL queries directly against the schema without HTTP overhead.

use feedback_core::domains::feedback::workflow::{FeedbackWorkflow, WorkflowSettings};
use feedback_core::kernel::test_dependencies::TestDependencies;
use feedback_core::kernel::{BaseExecutionBackend, LocalExecutionBackend, ServerDeps};
use feedback_core::server::graphql::{create_schema, GraphQLContext, Schema};
use juniper::{Value as GraphQLValue, Variables};
use serde_json::Value;
use std::sync::Arc;

/// GraphQL client for executing queries and mutations in tests.
pub struct GraphQLClient {
    schema: Schema,
    context: GraphQLContext,
}

/// One GraphQL error with its extensions.
#[derive(Debug, Clone)]
pub struct GraphQLErrorInfo {
    pub message: String,
    pub extensions: Value,
}

/// Result of a GraphQL execution.
#[derive(Debug)]
pub struct GraphQLResult {
    pub data: Option<Value>,
    pub errors: Vec<GraphQLErrorInfo>,
}

impl GraphQLResult {
    /// Returns true if the execution had no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Unwraps the data, panicking if there were errors.
    pub fn unwrap(self) -> Value {
        if !self.errors.is_empty() {
            panic!("GraphQL errors: {:?}", self.errors);
        }
        self.data.expect("No data returned")
    }

    /// Gets a value at the given JSON path, e.g. `submitFeedback.status`.
    pub fn get(&self, path: &str) -> Value {
        let data = self.data.as_ref().expect("No data returned");
        let mut current = data;
        for key in path.split('.') {
            current = &current[key];
        }
        current.clone()
    }
}

impl GraphQLClient {
    /// Client whose mutations run the workflow in-process over the given mocks.
    pub fn new(deps: &TestDependencies, settings: WorkflowSettings) -> Self {
        let server_deps = deps.server_deps();
        let workflow = FeedbackWorkflow::from_deps(&server_deps, settings.clone());
        let backend = Arc::new(LocalExecutionBackend::new(Arc::new(workflow)));
        Self::with_backend(server_deps, backend, &settings.state_machine_arn)
    }

    /// Client with a custom execution backend (for gateway error mapping).
    pub fn with_backend(
        server_deps: ServerDeps,
        backend: Arc<dyn BaseExecutionBackend>,
        state_machine_arn: &str,
    ) -> Self {
        Self {
            schema: create_schema(),
            context: GraphQLContext::new(Arc::new(server_deps), backend, state_machine_arn),
        }
    }

    /// Execute a GraphQL query/mutation.
    pub async fn execute(&self, query: &str) -> GraphQLResult {
        self.execute_with_vars(query, Variables::new()).await
    }

    /// Execute a GraphQL query/mutation with variables.
    pub async fn execute_with_vars(&self, query: &str, variables: Variables) -> GraphQLResult {
        let (result, errors) =
            juniper::execute(query, None, &self.schema, &variables, &self.context)
                .await
                .expect("GraphQL execution failed");

        // Convert juniper::Value to serde_json::Value
        let data = Some(serde_json::to_value(&result).expect("Failed to serialize GraphQL result"));

        let errors = errors
            .iter()
            .map(|e| {
                let field_error = e.error();
                let extensions = match field_error.extensions() {
                    GraphQLValue::Null => Value::Null,
                    other => serde_json::to_value(other).expect("Failed to serialize extensions"),
                };
                GraphQLErrorInfo {
                    message: field_error.message().to_string(),
                    extensions,
                }
            })
            .collect();

        GraphQLResult { data, errors }
    }

    /// Execute a query with variables and expect success.
    pub async fn query_with_vars(&self, query: &str, variables: Variables) -> Value {
        self.execute_with_vars(query, variables).await.unwrap()
    }
}
