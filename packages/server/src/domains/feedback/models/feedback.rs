use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::sentiment::Sentiment;

pub const FEEDBACK_TYPENAME: &str = "Feedback";

/// Feedback model - SQL persistence layer
///
/// One row per workflow execution. Rows are written once and never updated;
/// `updated_at` exists to match the record shape clients already read.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    #[serde(rename = "__typename")]
    pub typename: String,
    pub content: String,
    /// Classifier label, verbatim
    pub sentiment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feedback {
    /// Build the record for one execution. Both timestamps are the moment the
    /// record step was entered.
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        sentiment: &Sentiment,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            typename: FEEDBACK_TYPENAME.to_string(),
            content: content.into(),
            sentiment: sentiment.as_label().to_string(),
            created_at: recorded_at,
            updated_at: recorded_at,
        }
    }

    pub fn sentiment(&self) -> Sentiment {
        Sentiment::from_label(&self.sentiment)
    }

    /// Find feedback by ID
    pub async fn find_by_id(id: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, typename, content, sentiment, created_at, updated_at
             FROM feedback WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Most recent feedback first
    pub async fn find_recent(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, typename, content, sentiment, created_at, updated_at
             FROM feedback
             ORDER BY created_at DESC, id DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert new feedback. Fails if a record with the same id already exists.
    pub async fn insert(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "INSERT INTO feedback (id, typename, content, sentiment, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&self.id)
        .bind(&self.typename)
        .bind(&self.content)
        .bind(&self.sentiment)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(pool)
        .await?;

        Ok(())
    }
}
