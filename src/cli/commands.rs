use anyhow::Result;
use colored::Colorize;

use crate::{
    app::{init_config, Config},
    models::ModelFactory,
    telegram::TelegramChannel,
};

use super::Commands;

/// Handle CLI subcommands; returns `false` when the bot should start
pub async fn handle_command(command: &Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            let path = init_config()?;
            println!("Configuration available at: {}", path.display());
            Ok(true)
        }
        Commands::Check => {
            show_status(config).await?;
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Run => Ok(false),
    }
}

/// Show version information
pub fn show_version() {
    println!("relaybot v{}", env!("CARGO_PKG_VERSION"));
    println!("   Relays Telegram chats to a language model");
}

/// Check the bot token and the model endpoint
async fn show_status(config: &Config) -> Result<()> {
    println!("relaybot status:");
    println!();

    match config.telegram.resolve_token() {
        Ok(token) => {
            let channel = TelegramChannel::new(
                &config.telegram.api_url,
                token,
                config.telegram.allowed_users.clone(),
                config.telegram.poll_timeout_secs,
            )?;
            match channel.get_me().await {
                Ok(name) => println!("  {} Telegram: authorized as @{}", "[OK]".green(), name),
                Err(e) => println!("  {} Telegram: {:#}", "[ERROR]".red(), e),
            }
        }
        Err(e) => println!("  {} Telegram: {}", "[ERROR]".red(), e),
    }

    let model_id = config.model.model_id();
    let model = ModelFactory::create(&model_id, config)?;
    if model.validate_connection().await? {
        println!("  {} Model endpoint: {} ({})", "[OK]".green(), config.litellm.proxy_url, model_id);
    } else {
        println!(
            "  {} Model endpoint: {} not reachable",
            "[ERROR]".red(),
            config.litellm.proxy_url
        );
    }

    println!();
    Ok(())
}
