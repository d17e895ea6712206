use clap::Parser;
use std::path::PathBuf;

/// Flight-fare search assistant for Kayak.com
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// A single request to send to the assistant
    #[arg(index = 1)] // Positional argument
    pub prompt: Option<String>,

    /// Enter interactive chat mode
    #[arg(short, long, default_value_t = false)]
    pub interactive: bool,

    /// Run a guided flight search from console prompts
    #[arg(short, long, default_value_t = false)]
    pub search: bool,

    /// Where to write the search result JSON (guided search mode)
    #[arg(long)]
    pub results_file: Option<PathBuf>,

    /// Base URL of the browser-automation agent daemon
    #[arg(long, env = "SKYSCOUT_AGENT_URL")]
    pub agent_url: Option<String>,
}
