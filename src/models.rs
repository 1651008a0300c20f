//! Data models for message handling and reporting
//!
//! This module contains the typed records read from the message store, the
//! filters used to query it, and the sentiment and training-pair structures
//! derived from them.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{MessagesError, Result};

/// Timestamp format produced by the message store queries
pub const STORE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date format accepted for day filters
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single stored message, already joined against the contacts directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Local time the message was sent, second precision
    pub timestamp: NaiveDateTime,
    /// Message text; absent for attachments and other non-text content
    pub text: Option<String>,
    /// True if the local user authored the message
    pub is_from_me: bool,
    /// Phone number or chat identifier of the other party
    pub counterpart_identifier: String,
    /// Name resolved from the contacts directory, if any
    pub display_name: Option<String>,
}

/// Positional row as returned by the message store:
/// `(timestamp, text, is_from_me, counterpart_identifier, display_name)`
pub type RawMessageRow = (String, Option<String>, i64, String, Option<String>);

impl TryFrom<RawMessageRow> for MessageRecord {
    type Error = MessagesError;

    fn try_from(row: RawMessageRow) -> Result<Self> {
        let (timestamp, text, is_from_me, counterpart_identifier, display_name) = row;
        let timestamp = NaiveDateTime::parse_from_str(&timestamp, STORE_TIMESTAMP_FORMAT)
            .map_err(|e| MessagesError::MalformedRecord(format!("timestamp '{timestamp}': {e}")))?;

        Ok(Self {
            timestamp,
            text,
            is_from_me: is_from_me != 0,
            counterpart_identifier,
            display_name,
        })
    }
}

impl MessageRecord {
    /// Message text, treating an absent body as empty
    #[must_use]
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// Message total for one conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessageCount {
    /// Chat identifier (phone number, email or group id)
    pub identifier: String,
    /// Number of messages in the conversation
    pub message_count: i64,
    /// Name resolved from the contacts directory, if any
    pub display_name: Option<String>,
}

/// A one-on-one conversation partner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactEntry {
    /// Chat identifier (phone number or email)
    pub identifier: String,
    /// Name resolved from the contacts directory, if any
    pub display_name: Option<String>,
}

/// Filter for message queries
///
/// Every field is optional; which combinations are allowed depends on the
/// operation (see the `validate_for_*` methods).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageFilter {
    /// Suffix match on the chat identifier
    pub number: Option<String>,
    /// Substring match on the directory display name
    pub name: Option<String>,
    /// Local calendar day the message was sent
    pub date: Option<NaiveDate>,
    /// Maximum number of rows to return
    pub limit: Option<usize>,
}

impl MessageFilter {
    /// Create an empty filter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to conversations whose identifier ends with `number`
    #[must_use]
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    /// Restrict to contacts whose name contains `name`
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restrict to one calendar day
    #[must_use]
    pub const fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Cap the number of returned rows
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn check_exclusive(&self) -> Result<()> {
        if self.number.is_some() && self.name.is_some() {
            return Err(MessagesError::InvalidFilter(
                "a contact name and a number cannot be specified at the same time".to_string(),
            ));
        }
        Ok(())
    }

    /// A dump needs a name, a number or a date
    pub fn validate_for_get(&self) -> Result<()> {
        self.check_exclusive()?;
        if self.number.is_none() && self.name.is_none() && self.date.is_none() {
            return Err(MessagesError::InvalidFilter(
                "specify a contact name, a number or a date".to_string(),
            ));
        }
        Ok(())
    }

    /// A search may be unscoped, but not scoped twice
    pub fn validate_for_search(&self) -> Result<()> {
        self.check_exclusive()
    }

    /// Training pairs only make sense for a single conversation partner
    pub fn validate_for_generate(&self) -> Result<()> {
        self.check_exclusive()?;
        if self.number.is_none() && self.name.is_none() {
            return Err(MessagesError::InvalidFilter(
                "specify a contact name or a number to generate training pairs".to_string(),
            ));
        }
        Ok(())
    }

    /// Human readable identifier of the filtered conversation
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.name.as_deref().or(self.number.as_deref())
    }
}

/// Per-message polarity scores from a lexicon analyzer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    /// Share of negative valence, in [0, 1]
    pub neg: f64,
    /// Share of neutral tokens, in [0, 1]
    pub neu: f64,
    /// Share of positive valence, in [0, 1]
    pub pos: f64,
    /// Normalized composite score, in [-1, 1]
    pub compound: f64,
}

impl SentimentScores {
    /// Scores used for empty or absent text
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            neg: 0.0,
            neu: 0.0,
            pos: 0.0,
            compound: 0.0,
        }
    }
}

/// Categorical sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentCategory {
    /// Compound score >= 0.05
    Positive,
    /// Compound score <= -0.05
    Negative,
    /// Compound score strictly between the two thresholds
    Neutral,
    /// No text to score at all
    Unknown,
}

impl SentimentCategory {
    /// Lowercase label used in reports and exports
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SentimentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary sentiment over a whole result set
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateSentimentStats {
    /// Mean compound score over every record, empty ones included
    pub mean_compound: f64,
    /// Category of the mean
    pub category: SentimentCategory,
}

/// A fetched message with its sentiment label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMessage {
    /// The stored message
    pub record: MessageRecord,
    /// Sentiment label for the message text
    pub sentiment: SentimentCategory,
}

/// One call-and-response training example
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptCompletionPair {
    /// Text sent by the local user
    pub prompt: String,
    /// Text sent back by the counterpart
    pub completion: String,
}

impl PromptCompletionPair {
    /// Create a pair from both sides
    #[must_use]
    pub fn new(prompt: impl Into<String>, completion: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            completion: completion.into(),
        }
    }

    /// Both sides have text
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.prompt.is_empty() && !self.completion.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(ts: &str) -> RawMessageRow {
        (ts.to_string(), Some("hi".to_string()), 1, "+15551234567".to_string(), None)
    }

    #[test]
    fn test_row_conversion() {
        let record = MessageRecord::try_from(raw("2023-04-01 12:30:05")).expect("valid row");
        assert!(record.is_from_me);
        assert_eq!(record.timestamp.format(STORE_TIMESTAMP_FORMAT).to_string(), "2023-04-01 12:30:05");
        assert_eq!(record.text_or_empty(), "hi");
    }

    #[test]
    fn test_row_conversion_rejects_bad_timestamp() {
        let err = MessageRecord::try_from(raw("yesterday")).unwrap_err();
        assert!(matches!(err, MessagesError::MalformedRecord(_)));
    }

    #[test]
    fn test_filter_rules() {
        assert!(MessageFilter::new().validate_for_get().is_err());
        assert!(MessageFilter::new().validate_for_search().is_ok());
        assert!(MessageFilter::new().with_number("555").with_name("Al").validate_for_search().is_err());

        let date = NaiveDate::from_ymd_opt(2023, 1, 2).expect("valid date");
        assert!(MessageFilter::new().with_date(date).validate_for_get().is_ok());
        assert!(MessageFilter::new().with_date(date).validate_for_generate().is_err());
        assert!(MessageFilter::new().with_name("Al").validate_for_generate().is_ok());
    }

    #[test]
    fn test_pair_serializes_as_prompt_completion() {
        let pair = PromptCompletionPair::new("hi", "hey \"you\"");
        let json = serde_json::to_string(&pair).expect("serializable");
        assert_eq!(json, r#"{"prompt":"hi","completion":"hey \"you\""}"#);
    }
}
