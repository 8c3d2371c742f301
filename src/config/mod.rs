//! # Configuration Management Module
//!
//! TOML configuration for the citychain bot, loaded once at startup.
//!
//! ## Configuration Structure
//!
//! - [`GameConfig`] - reference lists, fuzzy threshold, optional RNG seed, idle timeout
//! - [`StorageConfig`] - data directory and store call timeout
//! - [`TriviaConfig`] - the optional AI trivia collaborator
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use citychain::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Cities: {}", config.game.cities_file);
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! cities_file = "data/cities.txt"
//! priority_file = "data/priority_cities.txt"
//! fuzzy_threshold = 75
//! session_timeout = 30  # minutes
//!
//! [storage]
//! data_dir = "./data"
//! io_timeout_ms = 2000
//!
//! [trivia]
//! enabled = false
//! api_key = ""
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::game::fuzzy::DEFAULT_THRESHOLD;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub trivia: TriviaConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Reference city list, one name per line.
    pub cities_file: String,
    /// Optional list of well-known cities the engine prefers when answering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_file: Option<String>,
    /// Minimum 0-100 similarity for a typo to resolve to a city.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: u8,
    /// Fixed seed for the engine's random choices (reproducible games). Random when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
    /// Minutes without a message before a player's in-memory slot is dropped
    /// (the stored session stays). 0 keeps slots forever.
    #[serde(default = "default_session_timeout")]
    pub session_timeout: u64,
}

fn default_session_timeout() -> u64 {
    30
}

fn default_fuzzy_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cities_file: "data/cities.txt".to_string(),
            priority_file: Some("data/priority_cities.txt".to_string()),
            fuzzy_threshold: DEFAULT_THRESHOLD,
            rng_seed: None,
            session_timeout: default_session_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Upper bound for every session / high-score store call.
    #[serde(default = "default_io_timeout_ms")]
    pub io_timeout_ms: u64,
}

fn default_io_timeout_ms() -> u64 {
    2000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            io_timeout_ms: default_io_timeout_ms(),
        }
    }
}

impl StorageConfig {
    pub fn sessions_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("sessions")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriviaConfig {
    /// Enable/disable trivia lookups
    pub enabled: bool,
    pub api_key: String,
    /// Messages endpoint
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

impl Default for TriviaConfig {
    fn default() -> Self {
        Self {
            enabled: false, // Disabled by default until an API key is provided
            api_key: String::new(),
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            max_tokens: 200,
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.game.fuzzy_threshold > 100 {
            return Err(anyhow!(
                "game.fuzzy_threshold must be within 0..=100 (got {})",
                self.game.fuzzy_threshold
            ));
        }
        if self.game.cities_file.trim().is_empty() {
            return Err(anyhow!("game.cities_file must not be empty"));
        }
        if self.storage.io_timeout_ms == 0 {
            return Err(anyhow!("storage.io_timeout_ms must be positive"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            game: GameConfig::default(),
            storage: StorageConfig::default(),
            trivia: TriviaConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("citychain.log".to_string()),
            },
        }
    }
}
