//! Feedback domain edges
//!
//! GraphQL entry points. Mutations go through the execution gateway; queries
//! read the feedback store directly.

pub mod mutation;
pub mod query;

pub use mutation::*;
pub use query::*;
