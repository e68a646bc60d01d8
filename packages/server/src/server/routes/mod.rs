// HTTP routes
pub mod executions;
pub mod graphql;
pub mod health;

pub use executions::*;
pub use graphql::*;
pub use health::*;
