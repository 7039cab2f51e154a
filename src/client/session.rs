use std::error::Error;
use std::io::Write;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::DefaultEditor;

use super::client::ReviewClient;
use super::display::{display_error, display_prediction};

fn print_help() {
    println!("\n{}", "ReelSense Review Commands".cyan());
    println!("{}", "=".repeat(60).bright_cyan());
    println!("{}        - Exit", "exit, bye, quit".green());
    println!("{}                   - Show this help message", "help".green());
    println!("{}                  - Clear the screen", "clear".green());
    println!("{}                 - Show whether the models are loaded", "status".green());
    println!("Anything else is sent as a movie review.");
    println!();
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {wide_msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message.to_string());
    pb
}

async fn handle_status(client: &ReviewClient) {
    match client.health().await {
        Ok(health) => {
            let state = format!("{:?}", health.engine.state).to_lowercase();
            println!("Service is {} (state: {}, vocabulary loaded: {}, models loaded: {})",
                health.status.green(), state, health.engine.vocabulary_loaded, health.engine.models_loaded);
        }
        Err(e) => display_error(&e),
    }
}

async fn handle_review(client: &ReviewClient, review: &str) {
    let pb = spinner("Analyzing review...");
    let result = client.predict(review).await;
    pb.finish_and_clear();

    match result {
        Ok(prediction) => display_prediction(&prediction),
        Err(e) => display_error(&e),
    }
}

/// Interactive loop: reads reviews from the terminal and shows both verdicts.
pub async fn review_loop(client: &ReviewClient) -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("Connected to {}", client.base_url());
    print_help();

    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("review > ") {
            Ok(input) => {
                let input_trimmed = input.trim();
                if input_trimmed.is_empty() {
                    continue;
                }

                match input_trimmed.to_lowercase().as_str() {
                    "exit" | "bye" | "quit" => {
                        println!("Goodbye!");
                        break;
                    }
                    "help" => print_help(),
                    "clear" => {
                        print!("\x1B[2J\x1B[1;1H");
                        std::io::stdout().flush()?;
                    }
                    "status" => handle_status(client).await,
                    _ => handle_review(client, input_trimmed).await,
                }

                let _ = rl.add_history_entry(input_trimmed);
            }
            Err(_) => {
                println!("Goodbye!");
                break;
            }
        }
    }
    Ok(())
}
