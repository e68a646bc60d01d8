pub mod feedback;
pub mod sentiment;

pub use feedback::{Feedback, FEEDBACK_TYPENAME};
pub use sentiment::{Sentiment, SentimentOutcome};
