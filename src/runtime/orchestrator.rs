use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{
    app::{get_config_dir, load_config, load_config_file, Config},
    bot::ConversationDispatcher,
    cli::{handle_command, Cli},
    dashboard::{is_interactive, run_dashboard},
    models::ModelFactory,
    session::{SessionStore, StatsSnapshot},
    stats::StatsFeed,
    telegram::TelegramChannel,
    utils::init_logger,
};

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let mut config = if let Some(config_path) = &cli.config {
            load_config_file(config_path)?
        } else {
            match load_config() {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("⚠️  Failed to load config: {:#}. Using defaults.", e);
                    Config::default()
                }
            }
        };

        apply_overrides(&mut config, &cli)?;

        Ok(Self { cli, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the orchestrator
    pub async fn run(self) -> Result<()> {
        if let Some(command) = &self.cli.command {
            if handle_command(command, &self.config).await? {
                return Ok(());
            }
        }

        let headless = self.config.stats.headless || !is_interactive();
        let log_file = if headless { None } else { Some(self.log_file()?) };
        init_logger(self.cli.verbose, log_file.as_deref())?;

        let model_id = self.config.model.model_id();
        println!("🤖 Starting relaybot with model: {}", model_id.green());
        if let Some(path) = &log_file {
            println!("📝 Logging to {}", path.display());
        }

        let model = ModelFactory::create(&model_id, &self.config)?;
        if !model.validate_connection().await.unwrap_or(false) {
            warn!(model = %model_id, "Model endpoint is not reachable yet; replies will fail until it is");
        }

        let store = Arc::new(SessionStore::new());
        let dispatcher = Arc::new(ConversationDispatcher::new(
            store.clone(),
            model,
            self.config.model.to_model_config(),
        ));
        let feed = StatsFeed::new(store.clone());
        let model_name = dispatcher.model_name().to_string();

        let token = self.config.telegram.resolve_token()?;
        let channel = Arc::new(TelegramChannel::new(
            &self.config.telegram.api_url,
            token,
            self.config.telegram.allowed_users.clone(),
            self.config.telegram.poll_timeout_secs,
        )?);
        let bot_name = channel
            .get_me()
            .await
            .context("Telegram rejected the bot token")?;
        info!(bot = %bot_name, "Connected to Telegram");

        let interval = Duration::from_secs(self.config.stats.interval_secs.max(1));
        let bot = tokio::spawn(channel.run(dispatcher));

        if headless {
            let stats_task = feed.spawn(interval, move |snapshot| {
                log_snapshot(&snapshot, store.len());
            });

            tokio::select! {
                res = bot => res.context("Telegram task panicked")??,
                _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
            }
            stats_task.abort();
        } else {
            let dashboard = tokio::task::spawn_blocking(move || {
                run_dashboard(feed, interval, &model_name)
            });

            tokio::select! {
                res = bot => res.context("Telegram task panicked")??,
                res = dashboard => {
                    res.context("Dashboard task panicked")??;
                    info!("Dashboard closed, shutting down");
                }
            }
        }

        Ok(())
    }

    fn log_file(&self) -> Result<PathBuf> {
        let dir = match &self.config.stats.log_dir {
            Some(dir) => dir.clone(),
            None => get_config_dir()?,
        };
        Ok(dir.join("relaybot.log"))
    }
}

/// Fold CLI flags into the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(token) = &cli.token {
        config.telegram.token = Some(token.clone());
    }

    if let Some(model) = &cli.model {
        let (provider, name) = model.split_once('/').with_context(|| {
            format!(
                "Invalid model '{}'. Expected 'provider/model' (e.g., 'gemini/gemini-2.0-flash-exp')",
                model
            )
        })?;
        config.model.provider = provider.to_string();
        config.model.name = name.to_string();
    }

    if cli.headless {
        config.stats.headless = true;
    }

    if let Some(secs) = cli.stats_interval {
        config.stats.interval_secs = secs;
    }

    Ok(())
}

fn log_snapshot(snapshot: &StatsSnapshot, sessions: usize) {
    info!(sessions, "{}", snapshot.to_status_line());
    if let Ok(json) = serde_json::to_string(snapshot) {
        debug!(snapshot = %json, "Stats snapshot");
    }
}
