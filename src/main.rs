use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use reelsense::client::{review_loop, ReviewClient};
use reelsense::config::Settings;
use reelsense::inference::InferenceEngine;
use reelsense::server::ApiServer;

#[derive(Parser)]
#[command(name = "reelsense", version, about = "Movie review sentiment from an LSTM and an RNN")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the prediction server (default)
    Serve,
    /// Predict one review in-process and print the result as JSON
    Predict {
        /// Review text
        text: String,
    },
    /// Interactive front end for a running server
    Review {
        /// Server base URL; defaults to the configured host and port
        #[arg(long)]
        url: Option<String>,
    },
}

/// Installs the global subscriber: a daily rolling file when `logging.file`
/// is set, stdout otherwise. `RUST_LOG` overrides the configured level.
fn init_logging(settings: &Settings) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    match settings.logging.file.as_deref() {
        Some(log_dir) => {
            let file_appender = tracing_appender::rolling::daily(log_dir, "reelsense");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::fmt()
                .with_writer(non_blocking)
                // Disable ANSI colors for cleaner log files
                .with_ansi(false)
                .with_line_number(true)
                .with_file(true)
                .with_thread_ids(true)
                .with_target(false)
                .with_env_filter(filter)
                .init();

            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_env_filter(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load settings first
    let settings = Settings::new().context("Failed to load settings")?;
    let _guard = init_logging(&settings);

    info!("ReelSense starting up...");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let engine = InferenceEngine::from_settings(&settings)?;
            let server = ApiServer::new(engine, settings.server.host.clone(), settings.server.port);
            server.start().await.map_err(|e| anyhow!(e))?;
        }
        Command::Predict { text } => {
            let engine = InferenceEngine::from_settings(&settings)?;
            let prediction = engine.predict(&text).await?;
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
        Command::Review { url } => {
            let url = url.unwrap_or_else(|| {
                format!("http://{}:{}", settings.server.host, settings.server.port)
            });
            let client = ReviewClient::new(url, Duration::from_secs(120))?;
            review_loop(&client).await.map_err(|e| anyhow!(e))?;
        }
    }

    Ok(())
}
