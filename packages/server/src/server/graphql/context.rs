use std::sync::Arc;

use crate::kernel::{BaseExecutionBackend, ServerDeps};

/// GraphQL request context
///
/// Contains shared resources available to all resolvers
#[derive(Clone)]
pub struct GraphQLContext {
    pub deps: Arc<ServerDeps>,
    /// Where `submitFeedback` sends execution requests
    pub execution_backend: Arc<dyn BaseExecutionBackend>,
    pub state_machine_arn: String,
}

impl juniper::Context for GraphQLContext {}

impl GraphQLContext {
    pub fn new(
        deps: Arc<ServerDeps>,
        execution_backend: Arc<dyn BaseExecutionBackend>,
        state_machine_arn: impl Into<String>,
    ) -> Self {
        Self {
            deps,
            execution_backend,
            state_machine_arn: state_machine_arn.into(),
        }
    }
}
