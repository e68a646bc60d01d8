//! Command-line feedback client
//!
//! Submits feedback to a running server and prints what the feedback page
//! would show, or lists recorded feedback.

use anyhow::Result;
use clap::{Parser, Subcommand};
use feedback_core::client::{FeedbackClient, FeedbackForm, FeedbackState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "feedback_cli")]
#[command(about = "Submit and list customer feedback")]
struct Cli {
    /// GraphQL endpoint of the feedback server
    #[arg(long, env = "FEEDBACK_API_URL", default_value = "http://localhost:8080/graphql")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one piece of feedback
    Submit { text: String },

    /// List recorded feedback, newest first
    List {
        #[arg(long)]
        limit: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = FeedbackClient::new(cli.endpoint);

    match cli.command {
        Commands::Submit { text } => {
            let mut form = FeedbackForm::new();
            form.set_draft(text);
            let state = form.submit(&client).await.clone();

            if let (Some(heading), Some(message)) = (state.heading(), state.message()) {
                println!("{}\n{}", heading, message);
            }
            if state == FeedbackState::Error {
                std::process::exit(1);
            }
        }
        Commands::List { limit } => {
            let feedback = client.list_feedback(limit).await?;
            if feedback.is_empty() {
                println!("No feedback recorded yet");
            }
            for item in feedback {
                println!("{}  {:<10} {}", item.created_at, item.sentiment, item.content);
            }
        }
    }

    Ok(())
}
