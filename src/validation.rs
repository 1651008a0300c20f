use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::models::DATE_FORMAT;

/// Largest accepted `--limit-number`
pub const MAX_LIMIT: usize = 1_000_000;

fn formatted_phone_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\+?[0-9 ()\-]+$").ok())
        .as_ref()
}

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate contact name
    pub fn validate_contact_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(anyhow!("Contact name cannot be empty"));
        }

        if name.chars().count() > 100 {
            return Err(anyhow!("Contact name too long (max 100 characters)"));
        }

        // Check for potentially dangerous characters
        if name.contains('\0') || name.contains('\r') || name.contains('\n') {
            return Err(anyhow!("Contact name contains invalid characters"));
        }

        Ok(())
    }

    /// Validate a counterpart identifier and return the form to match on
    ///
    /// Chat identifiers, email handles and partial numbers pass through
    /// trimmed. A formatted phone number such as `(513) 555-0100` loses its
    /// spaces, dashes and parentheses so it can suffix-match the stored
    /// `+15135550100`.
    pub fn validate_identifier(identifier: &str) -> Result<String> {
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("Number cannot be empty"));
        }

        if trimmed.chars().count() > 100 {
            return Err(anyhow!("Number too long (max 100 characters)"));
        }

        if trimmed.chars().any(char::is_control) {
            return Err(anyhow!("Number contains invalid characters"));
        }

        if !formatted_phone_pattern().is_some_and(|re| re.is_match(trimmed)) {
            return Ok(trimmed.to_string());
        }

        let digits: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ' ' | '(' | ')' | '-'))
            .collect();
        if !digits.chars().any(|c| c.is_ascii_digit()) {
            return Err(anyhow!("Invalid number '{identifier}': no digits"));
        }

        Ok(digits)
    }

    /// Parse and validate a `YYYY-MM-DD` day filter
    pub fn parse_date(date: &str) -> Result<NaiveDate> {
        let parsed = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
            .map_err(|_| anyhow!("Invalid date '{date}'. Enter as YYYY-MM-DD"))?;

        if parsed > Local::now().date_naive() {
            tracing::warn!("Date {} is in the future; no messages will match", parsed);
        }

        Ok(parsed)
    }

    /// Validate result limit
    pub fn validate_limit(limit: usize) -> Result<()> {
        if limit == 0 {
            return Err(anyhow!("Limit must be greater than 0"));
        }

        if limit > MAX_LIMIT {
            return Err(anyhow!("Limit too large (max {MAX_LIMIT})"));
        }

        Ok(())
    }

    /// Validate free-text search input
    pub fn validate_search_text(text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(anyhow!("Search text cannot be empty"));
        }

        if text.contains('\0') {
            return Err(anyhow!("Search text contains invalid characters"));
        }

        if text.chars().count() > 1000 {
            return Err(anyhow!("Search text too long (max 1000 characters)"));
        }

        Ok(())
    }

    /// Validate an output directory
    pub fn validate_output_dir(path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        if path_str.trim().is_empty() {
            return Err(anyhow!("Output directory cannot be empty"));
        }

        if path_str.contains('\0') {
            return Err(anyhow!("Output directory contains invalid characters"));
        }

        // Check path length
        if path_str.len() > 4096 {
            return Err(anyhow!("Output directory path too long (max 4096 characters)"));
        }

        if path.exists() && !path.is_dir() {
            return Err(anyhow!("Output path exists and is not a directory: {path:?}"));
        }

        Ok(())
    }

    /// Validate the messages database path
    pub fn validate_messages_db_path(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(anyhow!("Messages database path does not exist: {path:?}"));
        }

        if !path.is_file() {
            return Err(anyhow!("Messages database path is not a file: {path:?}"));
        }

        Ok(())
    }
}
