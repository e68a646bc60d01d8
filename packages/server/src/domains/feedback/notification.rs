//! Customer support notification payload.

use serde::{Deserialize, Serialize};

use super::models::Sentiment;

pub const NON_POSITIVE_MESSAGE: &str = "Non-positive feedback detected.";

/// Message published to the support subscriber for non-positive feedback.
///
/// Serializes to `{"Message": ..., "Detected sentiment": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Detected sentiment")]
    pub detected_sentiment: String,
}

impl Notification {
    pub fn non_positive(sentiment: &Sentiment) -> Self {
        Self {
            message: NON_POSITIVE_MESSAGE.to_string(),
            detected_sentiment: sentiment.as_label().to_string(),
        }
    }

    /// The wire form, as published to the subscriber.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
