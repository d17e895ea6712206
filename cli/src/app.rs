use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use skyscout_core::dates;
use skyscout_core::report;
use skyscout_core::search::{BrowserAgent, FlightSearcher, SearchOutcome, SearchParameters};

use crate::output::{print_assistant_reply, print_banner};
use crate::session::ChatSession;

/// Busy indicator shown while a turn is in flight. Purely presentational;
/// the steady tick stops when the turn resolves.
fn thinking_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner} {msg}")
            .unwrap(),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Runs a single turn, sending one prompt through the session and displaying the reply
pub async fn run_single_query(prompt: String, session: &mut ChatSession) -> Result<()> {
    info!("Running single query: {}", prompt);

    let spinner = thinking_spinner("Thinking...");
    match session.process_turn(&prompt).await {
        Ok(reply) => {
            spinner.finish_and_clear();
            print_assistant_reply(&reply);
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Failed to process prompt: {}", e);
            eprintln!("{}", format!("Error: {}", e).red());
        }
    }

    Ok(())
}

/// Runs the interactive chat loop
pub async fn run_interactive_chat(session: &mut ChatSession) -> Result<()> {
    print_banner();

    loop {
        // Prompt for user input
        print!("{}: ", "You".green().bold());
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .context("Failed to read input")?;
        if bytes == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Check for exit command
        if input.eq_ignore_ascii_case("exit")
            || input.eq_ignore_ascii_case("quit")
            || input.eq_ignore_ascii_case("bye")
        {
            println!("\n{} Goodbye! Have a great trip!\n", "Assistant:".blue().bold());
            break;
        }

        let spinner = thinking_spinner("Thinking...");
        match session.process_turn(input).await {
            Ok(reply) => {
                spinner.finish_and_clear();
                print_assistant_reply(&reply);
            }
            Err(e) => {
                // Per-turn errors never end the loop.
                spinner.finish_and_clear();
                error!("Turn failed: {}", e);
                eprintln!("{}", format!("Error: {}", e).red());
                println!(
                    "{} Sorry, I encountered an error. Please try again.\n",
                    "Assistant:".blue().bold()
                );
            }
        }
    }

    Ok(())
}

/// Reads one trimmed line, failing on end of input so prompt loops can't
/// spin on a closed stdin.
fn read_trimmed_line(reader: &mut impl io::BufRead) -> Result<String> {
    let mut input = String::new();
    let bytes = reader
        .read_line(&mut input)
        .context("Failed to read input")?;
    if bytes == 0 {
        anyhow::bail!("Input ended before the search was configured");
    }
    Ok(input.trim().to_string())
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush().context("Failed to flush stdout")?;
    read_trimmed_line(&mut io::stdin().lock())
}

/// Guided standalone search: console prompts, one search, result file.
///
/// A failed search is reported and recorded in the result file, but the
/// run still exits cleanly.
pub async fn run_guided_search(agent: Arc<dyn BrowserAgent>, results_path: &Path) -> Result<()> {
    println!("\n{}", "=".repeat(70));
    println!("  This assistant will help you find cheap flights on Kayak.com");
    println!("{}\n", "=".repeat(70));

    let origin = read_line("Enter origin airport code (e.g., SFO): ")?.to_uppercase();
    let destination = read_line("Enter destination airport code (e.g., JFK): ")?.to_uppercase();

    let round_trip = dialoguer::Confirm::new()
        .with_prompt("Is this a round trip?")
        .default(true)
        .interact()
        .context("Failed to read confirmation")?;

    let today = Local::now().date_naive();
    let departure = loop {
        let input = read_line("Enter departure date (MM/DD): ")?;
        match dates::normalize_departure(&input, today) {
            Ok(date) => break date,
            Err(e) => println!("{}", format!("{}. Please try again.", e).red()),
        }
    };

    let params = if round_trip {
        let return_date = loop {
            let input = read_line("Enter return date (MM/DD): ")?;
            match dates::normalize_return(&input, departure) {
                Ok(date) => break date,
                Err(e) => println!("{}", format!("{}. Please try again.", e).red()),
            }
        };
        SearchParameters::round_trip(origin, destination, departure, return_date)
    } else {
        SearchParameters::one_way(origin, destination, departure)
    };

    println!(
        "\nStarting Kayak flight search from {} to {}...",
        params.origin, params.destination
    );
    println!("Departure date: {}", params.departure_date.format("%B %d, %Y"));
    if let Some(return_date) = params.return_date {
        println!("Return date: {}", return_date.format("%B %d, %Y"));
    }

    let searcher = FlightSearcher::new(agent);
    let spinner = thinking_spinner("Searching Kayak... this drives a live browser and may take a while");
    let outcome = searcher.search(&params).await;
    spinner.finish_and_clear();

    match &outcome {
        SearchOutcome::Success { parameters, .. } => {
            println!("{}", "Flight search completed successfully!".green());
            println!(
                "Search parameters: {} -> {}, {}, departing {}",
                parameters.origin,
                parameters.destination,
                parameters.trip_type(),
                parameters.departure_date
            );
        }
        SearchOutcome::Failure { message } => {
            println!("{}", format!("Flight search failed: {}", message).red());
        }
    }

    report::write_record(results_path, &outcome)
        .with_context(|| format!("Failed to write results to {}", results_path.display()))?;
    println!("Results saved to {}", results_path.display());

    Ok(())
}
