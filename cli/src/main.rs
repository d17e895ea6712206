use clap::Parser;
use colored::*;
use dotenvy::dotenv;
use log::LevelFilter;
use std::error::Error;
use std::sync::Arc;

use skyscout_core::client::GeminiClient;
use skyscout_core::config::Config;
use skyscout_core::search::AgentClient;

mod app;
mod cli;
mod output;
mod session;

use crate::cli::Args;
use crate::output::print_usage_instructions;
use crate::session::ChatSession;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables before touching the config
    dotenv().ok();

    let config = Config::load()?;

    // Get log level from config or use default
    let log_level = config
        .log_level
        .as_deref()
        .map(|level| match level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            _ => LevelFilter::Info,
        })
        .unwrap_or(LevelFilter::Warn);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.to_string()),
    )
    .init();

    let args = Args::parse();

    // Credential absence is fatal before any interactive work begins.
    let api_key = match config.require_api_key() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{}", format!("{}", e).red());
            eprintln!("Add GEMINI_API_KEY to your environment or .env file.");
            return Err(e.into());
        }
    };

    let agent_url = args.agent_url.clone().unwrap_or_else(|| config.agent_url());
    let agent = Arc::new(AgentClient::new(agent_url));

    if !agent.test_connection().await {
        // Searches will fail into the conversation, so only warn here.
        eprintln!(
            "{}",
            "Warning: could not reach the browser agent daemon; flight searches will fail."
                .yellow()
        );
    }

    if args.search {
        let results_path = args
            .results_file
            .clone()
            .unwrap_or_else(|| config.results_file());
        if let Err(e) = app::run_guided_search(agent, &results_path).await {
            eprintln!("{}", format!("Error: {}", e).red());
            return Err(e.into());
        }
        return Ok(());
    }

    let model_name = config
        .model_name
        .clone()
        .unwrap_or_else(|| "gemini-2.0-flash-exp".to_string());
    let model = Arc::new(GeminiClient::new(api_key, model_name)?);
    let mut session = ChatSession::new(model, agent);

    if args.interactive {
        if let Err(e) = app::run_interactive_chat(&mut session).await {
            eprintln!("{}", format!("Interactive chat failed: {}", e).red());
        }
    } else if let Some(prompt) = args.prompt.clone() {
        if let Err(e) = app::run_single_query(prompt, &mut session).await {
            eprintln!("{}", format!("Error processing prompt: {}", e).red());
        }
    } else {
        // No prompt and not interactive, show usage
        print_usage_instructions();
    }

    Ok(())
}
