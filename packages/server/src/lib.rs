// Feedback Sentiment Workflow - API Core
//
// A GraphQL mutation runs a synchronous workflow that classifies the sentiment of
// submitted feedback, records it, and escalates non-positive feedback to support.
//
// The workflow lives in domains/feedback/workflow; external services sit behind
// the Base* traits in kernel/traits.rs.

pub mod client;
pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
