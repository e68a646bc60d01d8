//! GraphQL schema definition.

use super::context::GraphQLContext;
use juniper::{EmptySubscription, FieldResult, RootNode};

use crate::domains::feedback::data::{Execution, FeedbackData};
use crate::domains::feedback::edges as feedback_edges;

pub struct Query;

#[juniper::graphql_object(context = GraphQLContext)]
impl Query {
    /// Get one feedback record by id
    async fn feedback(ctx: &GraphQLContext, id: String) -> FieldResult<Option<FeedbackData>> {
        feedback_edges::get_feedback(id, ctx).await
    }

    /// Most recent feedback first (default 50, at most 200)
    async fn feedbacks(ctx: &GraphQLContext, limit: Option<i32>) -> FieldResult<Vec<FeedbackData>> {
        feedback_edges::get_feedbacks(limit, ctx).await
    }
}

pub struct Mutation;

#[juniper::graphql_object(context = GraphQLContext)]
impl Mutation {
    /// Classify, record and route a piece of customer feedback
    async fn submit_feedback(ctx: &GraphQLContext, input: String) -> FieldResult<Execution> {
        feedback_edges::submit_feedback(input, ctx).await
    }

    /// Same as `submitFeedback`; kept for clients built against the original field name
    async fn execute_state_machine(
        ctx: &GraphQLContext,
        input: Option<String>,
    ) -> FieldResult<Execution> {
        feedback_edges::submit_feedback(input.unwrap_or_default(), ctx).await
    }
}

pub type Schema = RootNode<'static, Query, Mutation, EmptySubscription<GraphQLContext>>;

pub fn create_schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}
