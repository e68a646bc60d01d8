use juniper::FieldResult;
use tracing::info;

use crate::domains::feedback::data::FeedbackData;
use crate::server::graphql::context::GraphQLContext;

pub const DEFAULT_FEEDBACK_LIMIT: i32 = 50;
pub const MAX_FEEDBACK_LIMIT: i32 = 200;

/// Get feedback by ID (the execution ARN that recorded it)
pub async fn get_feedback(id: String, ctx: &GraphQLContext) -> FieldResult<Option<FeedbackData>> {
    info!("get_feedback query called: {}", id);

    let feedback = ctx.deps.feedback_queries.get_feedback(&id).await?;

    Ok(feedback.map(FeedbackData::from))
}

/// Get the most recent feedback, newest first
pub async fn get_feedbacks(
    limit: Option<i32>,
    ctx: &GraphQLContext,
) -> FieldResult<Vec<FeedbackData>> {
    let limit = clamp_limit(limit);
    info!("get_feedbacks query called (limit {})", limit);

    let feedback = ctx.deps.feedback_queries.list_feedback(limit).await?;

    Ok(feedback.into_iter().map(FeedbackData::from).collect())
}

fn clamp_limit(limit: Option<i32>) -> i64 {
    i64::from(limit.unwrap_or(DEFAULT_FEEDBACK_LIMIT).clamp(0, MAX_FEEDBACK_LIMIT))
}
