//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by the workflow
//! and the GraphQL resolvers. All external services sit behind trait objects.

use anyhow::{Context, Result};
use openai_client::OpenAIClient;
use sqlx::PgPool;
use std::sync::Arc;
use twilio::{TwilioOptions, TwilioService};

use crate::config::{ClassifierKind, Config, NotifierKind};
use crate::kernel::{
    BaseFeedbackQueries, BaseFeedbackStore, BaseNotifier, BaseSentimentClassifier,
    InMemoryFeedbackStore, LexiconClassifier, LogNotifier, OpenAiSentimentClassifier,
    PostgresFeedbackStore, TwilioNotifier, WebhookNotifier,
};

/// Server dependencies accessible to the workflow and resolvers
#[derive(Clone)]
pub struct ServerDeps {
    pub classifier: Arc<dyn BaseSentimentClassifier>,
    pub feedback_store: Arc<dyn BaseFeedbackStore>,
    pub feedback_queries: Arc<dyn BaseFeedbackQueries>,
    pub notifier: Arc<dyn BaseNotifier>,
    /// Present when feedback is stored in Postgres
    pub db_pool: Option<PgPool>,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        classifier: Arc<dyn BaseSentimentClassifier>,
        feedback_store: Arc<dyn BaseFeedbackStore>,
        feedback_queries: Arc<dyn BaseFeedbackQueries>,
        notifier: Arc<dyn BaseNotifier>,
        db_pool: Option<PgPool>,
    ) -> Self {
        Self {
            classifier,
            feedback_store,
            feedback_queries,
            notifier,
            db_pool,
        }
    }

    /// Wire production dependencies from configuration.
    ///
    /// With a pool, feedback goes to Postgres; without one, to process memory.
    pub fn from_config(config: &Config, db_pool: Option<PgPool>) -> Result<Self> {
        let (feedback_store, feedback_queries): (
            Arc<dyn BaseFeedbackStore>,
            Arc<dyn BaseFeedbackQueries>,
        ) = match &db_pool {
            Some(pool) => {
                let store = Arc::new(PostgresFeedbackStore::new(pool.clone()));
                (store.clone(), store)
            }
            None => {
                tracing::warn!("DATABASE_URL not set; feedback is kept in memory only");
                let store = Arc::new(InMemoryFeedbackStore::new());
                (store.clone(), store)
            }
        };

        Ok(Self::new(
            create_classifier(&config.classifier)?,
            feedback_store,
            feedback_queries,
            create_notifier(&config.notifier, &config.support_subscriber)?,
            db_pool,
        ))
    }
}

pub fn create_classifier(kind: &ClassifierKind) -> Result<Arc<dyn BaseSentimentClassifier>> {
    let classifier: Arc<dyn BaseSentimentClassifier> = match kind {
        ClassifierKind::Lexicon => Arc::new(LexiconClassifier::new()),
        ClassifierKind::OpenAi { api_key, model } => {
            let client = OpenAIClient::new(api_key.clone())
                .context("Failed to create OpenAI client")?;
            Arc::new(OpenAiSentimentClassifier::new(client, model.clone()))
        }
    };
    Ok(classifier)
}

pub fn create_notifier(kind: &NotifierKind, subscriber: &str) -> Result<Arc<dyn BaseNotifier>> {
    let notifier: Arc<dyn BaseNotifier> = match kind {
        NotifierKind::Log => Arc::new(LogNotifier::new(subscriber)),
        NotifierKind::Webhook { url } => Arc::new(WebhookNotifier::new(url.clone(), subscriber)?),
        NotifierKind::Twilio {
            account_sid,
            auth_token,
            from,
        } => {
            let service = TwilioService::new(TwilioOptions {
                account_sid: account_sid.clone(),
                auth_token: auth_token.clone(),
                from: from.clone(),
            })
            .context("Failed to create Twilio client")?;
            Arc::new(TwilioNotifier::new(Arc::new(service), subscriber))
        }
    };
    Ok(notifier)
}
