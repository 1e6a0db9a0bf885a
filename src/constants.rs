/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_LITELLM_PROXY_URL: &str = "http://localhost:4000";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 600; // 10 minutes for large model requests
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 3;
pub const TELEGRAM_POLL_TIMEOUT_SECS: u64 = 30;
pub const TELEGRAM_RETRY_DELAY_SECS: u64 = 5;

// Telegram limits
pub const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;

// Stats
pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 10;
pub const UI_EVENT_POLL_MS: u64 = 250;

// Default Model Configuration (matches the generation config the bot was tuned with)
pub const DEFAULT_MODEL_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL_NAME: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_TEMPERATURE: f32 = 1.0;
pub const DEFAULT_TOP_P: f32 = 0.95;
pub const DEFAULT_MAX_TOKENS: usize = 8192;
pub const DEFAULT_MAX_HISTORY_MESSAGES: usize = 40;

// Commands
pub const COMMAND_PREFIX: char = '/';
