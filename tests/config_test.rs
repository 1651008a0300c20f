//! Unit tests for config.rs module

use message_insights::config::{AppConfig, DatabaseConfig, GenerateConfig, LoggingConfig, PrivacyConfig};
use message_insights::logging::LogFormat;
use message_insights::turns::TimeWindow;
use std::path::PathBuf;

#[test]
fn test_default_config_values() {
    let config = AppConfig::default();

    assert_eq!(config.database.messages_path, "");
    assert_eq!(config.database.address_book_path, None);
    assert_eq!(config.database.address_book_dir, "");
}

#[test]
fn test_default_logging_config() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, "info");
    assert_eq!(config.file_path, None);
    assert_eq!(config.format, "text");
    assert_eq!(config.log_format().expect("default format"), LogFormat::Text);
}

#[test]
fn test_default_generate_config() {
    let config = GenerateConfig::default();

    assert_eq!(config.merge_window_minutes, 30);
    assert_eq!(config.time_window, "legacy");
    assert!(config.strip_non_ascii);
    assert_eq!(config.output_directory, ".");
}

#[test]
fn test_default_privacy_config() {
    let config = PrivacyConfig::default();

    assert!(!config.mask_pii);
    assert!(!config.scramble_text);
}

#[test]
fn test_default_config_is_valid() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_invalid_log_level() {
    let mut config = AppConfig::default();
    config.logging.level = "verbose".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_log_format() {
    let mut config = AppConfig::default();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
    assert!(config.logging.log_format().is_err());
}

#[test]
fn test_json_log_format() {
    let mut config = AppConfig::default();
    config.logging.format = "JSON".to_string();
    assert!(config.validate().is_ok());
    assert_eq!(config.logging.log_format().expect("json"), LogFormat::Json);
}

#[test]
fn test_all_log_levels_accepted() {
    for level in ["trace", "debug", "info", "warn", "error"] {
        let mut config = AppConfig::default();
        config.logging.level = level.to_string();
        assert!(config.validate().is_ok(), "level {level} should be valid");
    }
}

#[test]
fn test_invalid_merge_window() {
    let mut config = AppConfig::default();
    config.generate.merge_window_minutes = 0;
    assert!(config.validate().is_err());

    config.generate.merge_window_minutes = -5;
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_time_window() {
    let mut config = AppConfig::default();
    config.generate.time_window = "hourly".to_string();
    assert!(config.validate().is_err());
    assert!(config.generate.aggregator().is_err());
}

#[test]
fn test_empty_output_directory() {
    let mut config = AppConfig::default();
    config.generate.output_directory = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_aggregator_from_config() {
    let config = GenerateConfig {
        merge_window_minutes: 10,
        time_window: "Elapsed".to_string(),
        strip_non_ascii: false,
        output_directory: "out".to_string(),
    };

    let aggregator = config.aggregator().expect("valid config");
    assert_eq!(aggregator.time_window(), TimeWindow::Elapsed);
}

#[test]
fn test_explicit_messages_path() {
    let config = DatabaseConfig {
        messages_path: "/tmp/chat.db".to_string(),
        ..DatabaseConfig::default()
    };

    // MESSAGES_DB_PATH takes precedence when set in the environment.
    let expected = std::env::var("MESSAGES_DB_PATH")
        .ok()
        .filter(|p| !p.is_empty())
        .map_or_else(|| PathBuf::from("/tmp/chat.db"), PathBuf::from);
    assert_eq!(config.messages_db_path(), expected);
}

#[test]
fn test_explicit_address_book_path() {
    let config = DatabaseConfig {
        address_book_path: Some("/tmp/AddressBook.abcddb".to_string()),
        ..DatabaseConfig::default()
    };
    assert_eq!(
        config.address_book_db_path(),
        Some(PathBuf::from("/tmp/AddressBook.abcddb"))
    );
}

#[test]
fn test_address_book_dir_without_files() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let config = DatabaseConfig {
        address_book_dir: dir.path().display().to_string(),
        ..DatabaseConfig::default()
    };
    assert_eq!(config.address_book_db_path(), None);
}

#[test]
fn test_config_serialization_round_trip() {
    let config = AppConfig::default();
    let json = serde_json::to_string(&config).expect("serializable");
    let parsed: AppConfig = serde_json::from_str(&json).expect("deserializable");
    assert_eq!(parsed.generate.time_window, config.generate.time_window);
    assert_eq!(parsed.logging.level, config.logging.level);
}
