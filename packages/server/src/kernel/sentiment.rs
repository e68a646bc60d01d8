//! Sentiment classifier implementations.
//!
//! - `LexiconClassifier` scores text against small word lists in-process.
//! - `OpenAiSentimentClassifier` asks an OpenAI chat model for a label through
//!   strict structured output.

use anyhow::{Context, Result};
use async_trait::async_trait;
use openai_client::OpenAIClient;
use schemars::JsonSchema;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::debug;

use crate::domains::feedback::models::Sentiment;
use crate::kernel::BaseSentimentClassifier;

// =============================================================================
// Lexicon classifier
// =============================================================================

const POSITIVE_WORDS: &[&str] = &[
    "amazing", "appreciate", "awesome", "best", "brilliant", "delighted", "enjoy", "enjoyed",
    "excellent", "fantastic", "friendly", "glad", "good", "great", "happy", "helpful", "impressed",
    "like", "love", "loved", "nice", "perfect", "pleasant", "quick", "recommend", "satisfied",
    "smooth", "superb", "thank", "thanks", "wonderful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "angry", "annoyed", "annoying", "awful", "bad", "broken", "confusing", "disappointed",
    "disappointing", "frustrated", "frustrating", "hate", "hated", "horrible", "poor", "rude",
    "slow", "terrible", "unhappy", "unacceptable", "useless", "waste", "worse", "worst", "wrong",
];

const NEGATORS: &[&str] = &["not", "no", "never", "hardly", "nothing"];

/// Word-list classifier with single-token negation ("not good" counts as negative).
///
/// Both polarities present -> MIXED, neither -> NEUTRAL.
pub struct LexiconClassifier {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
        }
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        let tokens: Vec<String> = text
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect();

        let mut positive = 0usize;
        let mut negative = 0usize;

        for (i, token) in tokens.iter().enumerate() {
            let polarity = if self.positive.contains(token.as_str()) {
                1i8
            } else if self.negative.contains(token.as_str()) {
                -1i8
            } else {
                continue;
            };

            let negated = i > 0 && is_negator(&tokens[i - 1]);
            match (polarity > 0) != negated {
                true => positive += 1,
                false => negative += 1,
            }
        }

        debug!(positive, negative, "Lexicon sentiment scores");

        match (positive > 0, negative > 0) {
            (true, true) => Sentiment::Mixed,
            (true, false) => Sentiment::Positive,
            (false, true) => Sentiment::Negative,
            (false, false) => Sentiment::Neutral,
        }
    }
}

fn is_negator(token: &str) -> bool {
    NEGATORS.contains(&token) || token.ends_with("n't")
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseSentimentClassifier for LexiconClassifier {
    async fn detect_sentiment(&self, text: &str, _language_code: &str) -> Result<Sentiment> {
        Ok(self.classify(text))
    }
}

// =============================================================================
// OpenAI classifier
// =============================================================================

const SYSTEM_PROMPT: &str = "You classify the sentiment of customer feedback. \
Set `sentiment` to exactly one of POSITIVE, NEGATIVE, NEUTRAL or MIXED.";

/// Reply shape the model is held to.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SentimentReply {
    /// POSITIVE, NEGATIVE, NEUTRAL or MIXED
    pub sentiment: String,
}

impl SentimentReply {
    /// Case and surrounding whitespace are normalised; anything outside the four
    /// labels is passed through as-is.
    pub fn into_sentiment(self) -> Sentiment {
        Sentiment::from_label(&self.sentiment.trim().to_uppercase())
    }
}

/// Classifier backed by OpenAI structured output.
#[derive(Clone)]
pub struct OpenAiSentimentClassifier {
    client: OpenAIClient,
    model: String,
}

impl OpenAiSentimentClassifier {
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl BaseSentimentClassifier for OpenAiSentimentClassifier {
    async fn detect_sentiment(&self, text: &str, language_code: &str) -> Result<Sentiment> {
        let user_prompt = format!("Language code: {}\n\nFeedback:\n{}", language_code, text);

        let reply: SentimentReply = self
            .client
            .extract(&self.model, SYSTEM_PROMPT, user_prompt)
            .await
            .context("OpenAI sentiment classification failed")?;
        let sentiment = reply.into_sentiment();

        debug!(model = %self.model, sentiment = %sentiment, "OpenAI sentiment classification");
        Ok(sentiment)
    }
}
