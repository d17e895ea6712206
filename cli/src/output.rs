use colored::*;

/// Welcome banner for the interactive assistant
pub fn print_banner() {
    println!("\n{}", "=".repeat(70).bright_blue().bold());
    println!(
        "{}",
        "          Flight Search Assistant - powered by Gemini"
            .bright_white()
            .bold()
    );
    println!("{}\n", "=".repeat(70).bright_blue().bold());

    println!("{}", "I can help you find the cheapest flights between any destinations.".yellow());
    println!("{}", "Just tell me where you want to go and when.".yellow());
    println!(
        "{} {} {}",
        "Type".yellow(),
        "'exit'".bold(),
        "to quit the assistant.".yellow()
    );
    println!();
}

/// Print the assistant's reply with a colored prefix
pub fn print_assistant_reply(reply: &str) {
    println!("{} {}\n", "Assistant:".blue().bold(), reply);
}

/// Show usage instructions when no prompt or action is provided
pub fn print_usage_instructions() {
    println!("{}", "Usage:".yellow().bold());
    println!("  {}", "skyscout \"your prompt\"".green().bold());
    println!("    Send a single request to the assistant");
    println!();
    println!("  {}", "skyscout -i".green().bold());
    println!("    Start an interactive chat session");
    println!();
    println!("  {}", "skyscout --search".green().bold());
    println!("    Run a guided flight search and write the result file");
    println!();
    println!("{}", "Options:".cyan());
    println!("  --results-file <PATH>  Where to write the search result JSON");
    println!("  --help                 Show this help message");
    println!();
}
