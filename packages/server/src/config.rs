use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::domains::feedback::workflow::NotificationFailurePolicy;

pub const DEFAULT_STATE_MACHINE_ARN: &str =
    "arn:feedback:states:local:stateMachine:FeedbackSentiment";

/// Which sentiment classifier backs the "Detect feedback sentiment" step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierKind {
    /// In-process word list scoring (no external calls)
    Lexicon,
    /// OpenAI chat completions
    OpenAi { api_key: String, model: String },
}

/// Where customer support notifications are delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierKind {
    /// Log the notification only (development)
    Log,
    /// POST the notification JSON to a URL
    Webhook { url: String },
    /// Send the notification as an SMS through Twilio
    Twilio {
        account_sid: String,
        auth_token: String,
        from: String,
    },
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Postgres store; the in-memory store is used when unset
    pub database_url: Option<String>,
    /// Remote workflow engine; executions run in-process when unset
    pub workflow_endpoint: Option<String>,
    pub state_machine_arn: String,
    pub execution_timeout: Duration,
    /// Budget for the support notification, capped by the execution deadline
    pub notify_timeout: Duration,
    pub max_input_bytes: usize,
    pub language_code: String,
    pub classifier: ClassifierKind,
    pub notifier: NotifierKind,
    /// The single subscriber that receives support notifications
    pub support_subscriber: String,
    pub notification_failure_policy: NotificationFailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            workflow_endpoint: None,
            state_machine_arn: DEFAULT_STATE_MACHINE_ARN.to_string(),
            execution_timeout: Duration::from_secs(30),
            notify_timeout: Duration::from_secs(5),
            max_input_bytes: 5000,
            language_code: "en".to_string(),
            classifier: ClassifierKind::Lexicon,
            notifier: NotifierKind::Log,
            support_subscriber: "support@example.com".to_string(),
            notification_failure_policy: NotificationFailurePolicy::BestEffort,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(v) => v.parse().context("PORT must be a valid number")?,
            None => defaults.port,
        };

        let execution_timeout = match non_empty("EXECUTION_TIMEOUT_SECS") {
            Some(v) => {
                let secs: u64 = v
                    .parse()
                    .context("EXECUTION_TIMEOUT_SECS must be a whole number of seconds")?;
                if secs == 0 {
                    bail!("EXECUTION_TIMEOUT_SECS must be greater than zero");
                }
                Duration::from_secs(secs)
            }
            None => defaults.execution_timeout,
        };

        let notify_timeout = match non_empty("NOTIFY_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.parse()
                    .context("NOTIFY_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => defaults.notify_timeout,
        };

        let max_input_bytes = match non_empty("MAX_INPUT_BYTES") {
            Some(v) => v.parse().context("MAX_INPUT_BYTES must be a valid number")?,
            None => defaults.max_input_bytes,
        };

        let classifier = match non_empty("CLASSIFIER").as_deref() {
            None | Some("lexicon") => ClassifierKind::Lexicon,
            Some("openai") => ClassifierKind::OpenAi {
                api_key: non_empty("OPENAI_API_KEY")
                    .context("OPENAI_API_KEY must be set when CLASSIFIER=openai")?,
                model: non_empty("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            },
            Some(other) => bail!("Unknown CLASSIFIER '{}' (expected lexicon or openai)", other),
        };

        let notifier = match non_empty("NOTIFIER").as_deref() {
            None | Some("log") => NotifierKind::Log,
            Some("webhook") => NotifierKind::Webhook {
                url: non_empty("NOTIFY_WEBHOOK_URL")
                    .context("NOTIFY_WEBHOOK_URL must be set when NOTIFIER=webhook")?,
            },
            Some("twilio") => NotifierKind::Twilio {
                account_sid: non_empty("TWILIO_ACCOUNT_SID")
                    .context("TWILIO_ACCOUNT_SID must be set when NOTIFIER=twilio")?,
                auth_token: non_empty("TWILIO_AUTH_TOKEN")
                    .context("TWILIO_AUTH_TOKEN must be set when NOTIFIER=twilio")?,
                from: non_empty("TWILIO_FROM_NUMBER")
                    .context("TWILIO_FROM_NUMBER must be set when NOTIFIER=twilio")?,
            },
            Some(other) => bail!(
                "Unknown NOTIFIER '{}' (expected log, webhook or twilio)",
                other
            ),
        };

        let notification_failure_policy = match non_empty("NOTIFICATION_FAILURE_POLICY") {
            Some(v) => v.parse()?,
            None => defaults.notification_failure_policy,
        };

        Ok(Self {
            port,
            database_url: non_empty("DATABASE_URL"),
            workflow_endpoint: non_empty("WORKFLOW_ENDPOINT"),
            state_machine_arn: non_empty("STATE_MACHINE_ARN")
                .unwrap_or(defaults.state_machine_arn),
            execution_timeout,
            notify_timeout,
            max_input_bytes,
            language_code: non_empty("LANGUAGE_CODE").unwrap_or(defaults.language_code),
            classifier,
            notifier,
            support_subscriber: non_empty("SUPPORT_SUBSCRIBER")
                .unwrap_or(defaults.support_subscriber),
            notification_failure_policy,
        })
    }
}
