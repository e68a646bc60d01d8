use juniper::FieldResult;
use tracing::{error, info};

use crate::domains::feedback::data::Execution;
use crate::domains::feedback::gateway::{map_request, map_response};
use crate::server::graphql::context::GraphQLContext;

/// Submit feedback and wait for the workflow to finish
///
/// A FAILED execution is still a successful call; only transport and upstream
/// errors become GraphQL errors.
pub async fn submit_feedback(input: String, ctx: &GraphQLContext) -> FieldResult<Execution> {
    info!("submit_feedback mutation called ({} bytes)", input.len());

    let request = map_request(&ctx.state_machine_arn, &input);
    let response = ctx.execution_backend.start_sync_execution(request).await;

    match map_response(response) {
        Ok(execution) => {
            info!(
                execution_arn = %execution.execution_arn,
                status = %execution.status,
                "Feedback execution finished"
            );
            Ok(execution)
        }
        Err(e) => {
            error!("Feedback execution could not be started: {}", e);
            Err(e.into_field_error())
        }
    }
}
