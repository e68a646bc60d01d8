//! Typed ID definitions for domain entities.

pub use super::id::Id;

/// Marker type for workflow executions.
pub struct Execution;

/// Identifier of one workflow execution. Also the basis of the feedback record id.
pub type ExecutionId = Id<Execution>;
