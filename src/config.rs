use std::path::PathBuf;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::db::MessagesDb;
use crate::logging::LogFormat;
use crate::turns::{TimeWindow, TurnAggregator, DEFAULT_MERGE_WINDOW_MINUTES};

/// Application configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database locations
    pub database: DatabaseConfig,
    /// Log output
    pub logging: LoggingConfig,
    /// Training pair generation
    pub generate: GenerateConfig,
    /// PII masking in terminal output
    pub privacy: PrivacyConfig,
}

/// Where the message and contact databases live
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to `chat.db`; empty means the per-user default
    pub messages_path: String,
    /// Explicit AddressBook database; takes precedence over `address_book_dir`
    pub address_book_path: Option<String>,
    /// Directory searched for the AddressBook database; empty means the per-user default
    pub address_book_dir: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter level
    pub level: String,
    /// Optional JSON log file, rotated daily
    pub file_path: Option<String>,
    /// Console format: "text" or "json"
    pub format: String,
}

/// Settings for prompt/completion generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Same-sender coalescing window
    pub merge_window_minutes: i64,
    /// "legacy" or "elapsed"
    pub time_window: String,
    /// Drop non-ASCII characters from training text
    pub strip_non_ascii: bool,
    /// Directory the JSONL file is written to
    pub output_directory: String,
}

/// Masking of personal data in reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrivacyConfig {
    /// Mask names and phone numbers
    pub mask_pii: bool,
    /// Shuffle message text
    pub scramble_text: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            format: "text".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parsed console format
    pub fn log_format(&self) -> Result<LogFormat> {
        match self.format.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!("Invalid log format: {}. Must be one of: text, json", other)),
        }
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            merge_window_minutes: DEFAULT_MERGE_WINDOW_MINUTES,
            time_window: TimeWindow::Legacy.to_string(),
            strip_non_ascii: true,
            output_directory: ".".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Messages database path, honouring `MESSAGES_DB_PATH`
    #[must_use]
    pub fn messages_db_path(&self) -> PathBuf {
        if let Ok(path) = std::env::var("MESSAGES_DB_PATH") {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
        if !self.messages_path.is_empty() {
            return PathBuf::from(&self.messages_path);
        }
        dirs::home_dir()
            .unwrap_or_default()
            .join("Library/Messages/chat.db")
    }

    /// AddressBook database to attach, if one can be found
    #[must_use]
    pub fn address_book_db_path(&self) -> Option<PathBuf> {
        if let Some(path) = self.address_book_path.as_ref().filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        let dir = if self.address_book_dir.is_empty() {
            dirs::home_dir()?.join("Library/Application Support/AddressBook")
        } else {
            PathBuf::from(&self.address_book_dir)
        };
        MessagesDb::find_address_book(&dir)
    }
}

impl GenerateConfig {
    /// Parsed window mode
    pub fn time_window(&self) -> Result<TimeWindow> {
        self.time_window.parse::<TimeWindow>().map_err(|e| anyhow::anyhow!(e))
    }

    /// Aggregator configured from these settings
    pub fn aggregator(&self) -> Result<TurnAggregator> {
        Ok(TurnAggregator::new(self.time_window()?)
            .with_merge_window(self.merge_window_minutes)
            .with_strip_non_ascii(self.strip_non_ascii))
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .add_source(
                Config::try_from(&Self::default())
                    .map_err(|e| anyhow::anyhow!("Failed to build default configuration: {}", e))?,
            )
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("messages").required(false))
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("MESSAGES").separator("__"))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }
        self.logging.log_format()?;

        // Validate generation config
        if self.generate.merge_window_minutes <= 0 {
            return Err(anyhow::anyhow!("merge_window_minutes must be greater than 0"));
        }
        self.generate.time_window()?;

        if self.generate.output_directory.trim().is_empty() {
            return Err(anyhow::anyhow!("output_directory cannot be empty"));
        }

        Ok(())
    }

    /// Get log level from environment or config
    #[must_use]
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }

    /// Mask names and numbers, honouring `MASK_PII_DATA`
    #[must_use]
    pub fn mask_pii(&self) -> bool {
        self.privacy.mask_pii || env_flag("MASK_PII_DATA")
    }

    /// Scramble message text, honouring `MASK_MESSAGE_TEXT`
    #[must_use]
    pub fn scramble_text(&self) -> bool {
        self.privacy.scramble_text || env_flag("MASK_MESSAGE_TEXT")
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| !v.is_empty())
}
