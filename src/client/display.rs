use colored::*;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::inference::{ModelPrediction, Prediction, Sentiment};
use super::client::ClientError;

fn sentiment_color(sentiment: Sentiment) -> Color {
    match sentiment {
        Sentiment::Positive => Color::Green,
        Sentiment::Negative => Color::Red,
    }
}

fn model_row(name: &str, prediction: &ModelPrediction) -> Vec<Cell> {
    vec![
        Cell::new(name).fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(prediction.sentiment.to_string())
            .fg(sentiment_color(prediction.sentiment))
            .set_alignment(CellAlignment::Center),
        Cell::new(format!("{:.1}%", prediction.confidence * 100.0)).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.4}", prediction.score)).set_alignment(CellAlignment::Right),
    ]
}

/// Builds the results table for both models
pub fn prediction_table(prediction: &Prediction) -> Table {
    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("Model").fg(Color::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Sentiment").fg(Color::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Confidence").fg(Color::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Score").fg(Color::Cyan).add_attribute(Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .add_row(model_row("LSTM", &prediction.lstm))
        .add_row(model_row("RNN", &prediction.rnn));
    table
}

pub fn display_prediction(prediction: &Prediction) {
    println!("\n{}", prediction_table(prediction));

    if prediction.lstm.sentiment != prediction.rnn.sentiment {
        println!("{}", "The models disagree on this review.".yellow());
    }
}

pub fn display_error(error: &ClientError) {
    match error {
        ClientError::Unreachable { url, source } => {
            println!("{}", "Cannot reach the prediction service.".red().bold());
            println!("{}", format!("Is the server running at {}? ({})", url, source).bright_black());
        }
        ClientError::Service { status, error, details, .. } => {
            println!("{}", format!("Prediction failed ({}): {}", status, error).red());
            if let Some(details) = details {
                println!("{}", details.bright_black());
            }
        }
        ClientError::Decode(message) => {
            println!("{}", format!("Unexpected response: {}", message).red());
        }
        ClientError::Setup(message) => {
            println!("{}", format!("Could not start the client: {}", message).red());
        }
    }
}
