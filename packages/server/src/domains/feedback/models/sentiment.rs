use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentiment label attached to a piece of feedback.
///
/// The four known labels are the classifier's fixed set. Anything else the
/// classifier returns is kept verbatim in `Other` so it can be persisted as-is.
/// Parsing is exact: `"positive"` is not `POSITIVE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Mixed,
    Other(String),
}

impl Sentiment {
    pub fn from_label(label: &str) -> Self {
        match label {
            "POSITIVE" => Self::Positive,
            "NEGATIVE" => Self::Negative,
            "NEUTRAL" => Self::Neutral,
            "MIXED" => Self::Mixed,
            other => Self::Other(other.to_string()),
        }
    }

    /// The classifier's label, verbatim.
    pub fn as_label(&self) -> &str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
            Self::Mixed => "MIXED",
            Self::Other(label) => label,
        }
    }

    /// Collapse the label into the workflow's two-way output.
    ///
    /// Only an exact POSITIVE stays positive; every other label, including ones
    /// we have never seen, escalates.
    pub fn outcome(&self) -> SentimentOutcome {
        match self {
            Self::Positive => SentimentOutcome::Positive,
            Self::Negative | Self::Neutral | Self::Mixed | Self::Other(_) => {
                SentimentOutcome::NonPositive
            }
        }
    }
}

impl From<String> for Sentiment {
    fn from(label: String) -> Self {
        match Self::from_label(&label) {
            Self::Other(_) => Self::Other(label),
            known => known,
        }
    }
}

impl From<Sentiment> for String {
    fn from(sentiment: Sentiment) -> Self {
        match sentiment {
            Sentiment::Other(label) => label,
            known => known.as_label().to_string(),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// The workflow's collapsed output value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentOutcome {
    #[serde(rename = "POSITIVE")]
    Positive,
    #[serde(rename = "NON-POSITIVE")]
    NonPositive,
}

impl SentimentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::NonPositive => "NON-POSITIVE",
        }
    }
}

impl fmt::Display for SentimentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
