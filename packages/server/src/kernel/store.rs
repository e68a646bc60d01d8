//! Feedback record stores.

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domains::feedback::models::Feedback;
use crate::kernel::{BaseFeedbackQueries, BaseFeedbackStore};

/// Postgres-backed store (the `feedback` table).
#[derive(Clone)]
pub struct PostgresFeedbackStore {
    pool: PgPool,
}

impl PostgresFeedbackStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseFeedbackStore for PostgresFeedbackStore {
    async fn put_feedback(&self, feedback: &Feedback) -> Result<()> {
        feedback.insert(&self.pool).await
    }
}

#[async_trait]
impl BaseFeedbackQueries for PostgresFeedbackStore {
    async fn get_feedback(&self, id: &str) -> Result<Option<Feedback>> {
        Feedback::find_by_id(id, &self.pool).await
    }

    async fn list_feedback(&self, limit: i64) -> Result<Vec<Feedback>> {
        Feedback::find_recent(limit, &self.pool).await
    }
}

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct InMemoryFeedbackStore {
    records: RwLock<HashMap<String, Feedback>>,
}

impl InMemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BaseFeedbackStore for InMemoryFeedbackStore {
    async fn put_feedback(&self, feedback: &Feedback) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| anyhow::anyhow!("feedback store lock poisoned"))?;

        if records.contains_key(&feedback.id) {
            bail!("Feedback {} already exists", feedback.id);
        }
        records.insert(feedback.id.clone(), feedback.clone());
        Ok(())
    }
}

#[async_trait]
impl BaseFeedbackQueries for InMemoryFeedbackStore {
    async fn get_feedback(&self, id: &str) -> Result<Option<Feedback>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow::anyhow!("feedback store lock poisoned"))?;
        Ok(records.get(id).cloned())
    }

    async fn list_feedback(&self, limit: i64) -> Result<Vec<Feedback>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow::anyhow!("feedback store lock poisoned"))?;

        let mut all: Vec<Feedback> = records.values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        all.truncate(limit.max(0) as usize);
        Ok(all)
    }
}
