use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "relaybot")]
#[command(version)]
#[command(about = "A Telegram bot that relays messages to a language model", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Telegram bot token (overrides the config file)
    #[arg(short, long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Model to use (e.g., gemini/gemini-2.0-flash-exp, openai/gpt-4o)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Log stats instead of showing the dashboard
    #[arg(long)]
    pub headless: bool,

    /// Seconds between stats refreshes
    #[arg(long)]
    pub stats_interval: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the bot (default)
    Run,
    /// Write a default configuration file
    Init,
    /// Check the bot token and the model endpoint
    Check,
    /// Show version information
    Version,
}
