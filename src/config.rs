use std::{env, path::PathBuf, time::Duration};

use log::{debug, error, info};

use crate::error::{BotError, Result};

const DEFAULT_PREFIX: &str = "!";
const DEFAULT_WAKE_WORD: &str = "blubbert";
const DEFAULT_RESPONSES_PATH: &str = "responses.json";
const DEFAULT_QUOTES_PATH: &str = "quotes.json";
const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TEACH_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub settings: Settings,
}

/// Everything the bot needs at runtime besides the Discord token.
#[derive(Debug, Clone)]
pub struct Settings {
    pub command_prefix: String,
    pub wake_word: String,
    pub responses_path: PathBuf,
    pub quotes_path: PathBuf,
    pub timeouts: Timeouts,
}

/// How long each prompt waits for the author's next message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Yes/no question after an unmatched message.
    pub confirm: Duration,
    /// Trigger and response prompts.
    pub teach: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            confirm: Duration::from_secs(DEFAULT_CONFIRM_TIMEOUT_SECS),
            teach: Duration::from_secs(DEFAULT_TEACH_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN").map_err(|e| {
            error!("Failed to load DISCORD_TOKEN from environment: {e}");
            e
        })?;

        let settings = Settings {
            command_prefix: env_or("COMMAND_PREFIX", DEFAULT_PREFIX),
            wake_word: env_or("WAKE_WORD", DEFAULT_WAKE_WORD),
            responses_path: PathBuf::from(env_or("RESPONSES_PATH", DEFAULT_RESPONSES_PATH)),
            quotes_path: PathBuf::from(env_or("QUOTES_PATH", DEFAULT_QUOTES_PATH)),
            timeouts: Timeouts {
                confirm: secs_from_env("CONFIRM_TIMEOUT_SECS", DEFAULT_CONFIRM_TIMEOUT_SECS)?,
                teach: secs_from_env("TEACH_TIMEOUT_SECS", DEFAULT_TEACH_TIMEOUT_SECS)?,
            },
        };

        if settings.wake_word.trim().is_empty() {
            return Err(BotError::Config("WAKE_WORD must not be empty".to_string()));
        }

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());
        debug!("Command prefix: {}", settings.command_prefix);
        debug!("Wake word: {}", settings.wake_word);
        debug!("Responses store: {}", settings.responses_path.display());
        debug!("Quotes store: {}", settings.quotes_path.display());
        debug!("Timeouts: {:?}", settings.timeouts);

        Ok(Self {
            discord_token,
            settings,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn secs_from_env(key: &str, default: u64) -> Result<Duration> {
    match env::var(key) {
        Ok(raw) => parse_secs(key, &raw),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(BotError::Config(format!("{key} must be greater than zero"))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(BotError::Config(format!(
            "{key} must be a whole number of seconds, got '{raw}': {e}"
        ))),
    }
}
