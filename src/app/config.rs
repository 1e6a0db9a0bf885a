use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_LITELLM_PROXY_URL, DEFAULT_MAX_HISTORY_MESSAGES, DEFAULT_MAX_TOKENS,
    DEFAULT_MODEL_NAME, DEFAULT_MODEL_PROVIDER, DEFAULT_STATS_INTERVAL_SECS,
    DEFAULT_TELEGRAM_API_URL, DEFAULT_TELEGRAM_TOKEN_ENV, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
    TELEGRAM_POLL_TIMEOUT_SECS,
};
use crate::models::ModelConfig;
use crate::utils::RelayError;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Telegram transport configuration
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Model configuration
    #[serde(default)]
    pub model: ModelSettings,

    /// LiteLLM proxy (or any OpenAI-compatible endpoint)
    #[serde(default)]
    pub litellm: LiteLlmConfig,

    /// Stats panel configuration
    #[serde(default)]
    pub stats: StatsConfig,
}

/// Telegram configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token; prefer `token_env` to keep it out of config files
    pub token: Option<String>,
    /// Environment variable containing the bot token
    pub token_env: String,
    /// User ids or usernames allowed to talk to the bot ("*" for everyone)
    pub allowed_users: Vec<String>,
    /// Long-poll window for getUpdates
    pub poll_timeout_secs: u64,
    /// Bot API base URL
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_env: DEFAULT_TELEGRAM_TOKEN_ENV.to_string(),
            allowed_users: vec!["*".to_string()],
            poll_timeout_secs: TELEGRAM_POLL_TIMEOUT_SECS,
            api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
        }
    }
}

impl TelegramConfig {
    /// The bot token from the config, or else from `token_env`
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(token.clone());
        }

        std::env::var(&self.token_env).map_err(|_| {
            RelayError::ConfigError(format!(
                "No Telegram bot token: set telegram.token, pass --token, or export {}",
                self.token_env
            ))
            .into()
        })
    }
}

/// Default model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Model provider as routed by the proxy (gemini, openai, anthropic, ollama)
    pub provider: String,
    /// Model name
    pub name: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Nucleus sampling
    pub top_p: f32,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// System prompt
    pub system_prompt: Option<String>,
    /// Messages of history replayed per request
    pub max_history_messages: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_MODEL_PROVIDER.to_string(),
            name: DEFAULT_MODEL_NAME.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: None,
            max_history_messages: DEFAULT_MAX_HISTORY_MESSAGES,
        }
    }
}

impl ModelSettings {
    /// `provider/name` identifier understood by the proxy
    pub fn model_id(&self) -> String {
        format!("{}/{}", self.provider, self.name)
    }

    pub fn to_model_config(&self) -> ModelConfig {
        ModelConfig {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            top_p: Some(self.top_p),
            system_prompt: self.system_prompt.clone(),
            max_history_messages: Some(self.max_history_messages),
        }
    }
}

/// LiteLLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiteLlmConfig {
    /// Base URL of the proxy
    pub proxy_url: String,
    /// Master key sent as bearer token
    pub master_key: Option<String>,
}

impl Default for LiteLlmConfig {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_LITELLM_PROXY_URL.to_string(),
            master_key: None,
        }
    }
}

/// Stats panel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Seconds between stats refreshes
    pub interval_secs: u64,
    /// Log stats instead of drawing the dashboard
    pub headless: bool,
    /// Where logs go while the dashboard owns the terminal
    pub log_dir: Option<PathBuf>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_STATS_INTERVAL_SECS,
            headless: false,
            log_dir: None,
        }
    }
}

/// Load configuration from multiple sources
pub fn load_config() -> Result<Config> {
    let config_dir = get_config_dir()?;
    let global_config = config_dir.join("config.toml");
    let local_config = PathBuf::from(".relaybot/config.toml");

    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if global_config.exists() {
        figment = figment.merge(Toml::file(&global_config));
    }

    if local_config.exists() {
        figment = figment.merge(Toml::file(&local_config));
    }

    // RELAYBOT_TELEGRAM__TOKEN sets telegram.token, and so on
    figment = figment.merge(Env::prefixed("RELAYBOT_").split("__"));

    figment
        .extract()
        .context("Failed to load configuration")
}

/// Load a single configuration file, with defaults for anything it omits
pub fn load_config_file(path: &Path) -> Result<Config> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    toml::from_str(&toml_str)
        .with_context(|| format!("Failed to parse config at {}", path.display()))
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "relaybot") {
        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        let config_dir = PathBuf::from(home).join(".config").join("relaybot");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist; returns its path
pub fn init_config() -> Result<PathBuf> {
    let config_file = get_config_dir()?.join("config.toml");

    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
    }

    Ok(config_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_follow_generation_config() {
        let config = Config::default();
        assert_eq!(config.model.model_id(), "gemini/gemini-2.0-flash-exp");
        assert_eq!(config.model.max_tokens, 8192);
        assert_eq!(config.stats.interval_secs, 10);
        assert_eq!(config.telegram.allowed_users, vec!["*".to_string()]);
    }

    #[test]
    fn test_save_and_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.model.name = "gemini-1.5-pro".to_string();
        config.stats.headless = true;
        save_config(&config, Some(path.clone())).unwrap();

        let loaded = load_config_file(&path).unwrap();
        assert_eq!(loaded.model.name, "gemini-1.5-pro");
        assert!(loaded.stats.headless);
        assert_eq!(loaded.litellm.proxy_url, DEFAULT_LITELLM_PROXY_URL);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[stats]\ninterval_secs = 3\n").unwrap();

        let loaded = load_config_file(&path).unwrap();
        assert_eq!(loaded.stats.interval_secs, 3);
        assert!(!loaded.stats.headless);
        assert_eq!(loaded.model.provider, DEFAULT_MODEL_PROVIDER);
    }

    #[test]
    fn test_token_from_config_wins() {
        let telegram = TelegramConfig {
            token: Some("123:ABC".to_string()),
            token_env: "RELAYBOT_TEST_UNSET_TOKEN_VAR".to_string(),
            ..TelegramConfig::default()
        };
        assert_eq!(telegram.resolve_token().unwrap(), "123:ABC");
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let telegram = TelegramConfig {
            token: None,
            token_env: "RELAYBOT_TEST_UNSET_TOKEN_VAR".to_string(),
            ..TelegramConfig::default()
        };
        let err = telegram.resolve_token().unwrap_err();
        assert!(err.to_string().contains("RELAYBOT_TEST_UNSET_TOKEN_VAR"));
    }

    #[test]
    fn test_model_config_from_settings() {
        let settings = ModelSettings {
            system_prompt: Some("be brief".to_string()),
            ..ModelSettings::default()
        };
        let config = settings.to_model_config();
        assert_eq!(config.top_p, Some(0.95));
        assert_eq!(config.system_prompt.as_deref(), Some("be brief"));
    }
}
