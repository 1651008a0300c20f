//! Message Insights - local message-history analysis
//!
//! A Rust library for reading a local Messages database and reporting on it:
//! conversation counts, per-contact message totals, sentiment, and
//! prompt/completion training pairs.
//!
//! # Features
//!
//! - Read-only queries against `chat.db`, with optional contact names from
//!   the AddressBook database
//! - Lexicon-based sentiment scoring and result-set aggregation
//! - Conversation turn grouping into JSONL training pairs
//! - PII masking for terminal output

/// Configuration management
pub mod config;
/// Read-only message store access
pub mod db;
/// Error types
pub mod error;
/// Training pair and CSV output files
pub mod file_writer;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Terminal result tables
pub mod printer;
/// PII masking
pub mod privacy;
/// Database schema definitions
pub mod schema;
/// Sentiment scoring and aggregation
pub mod sentiment;
/// Operations behind each CLI command
pub mod service;
/// Conversation turn aggregation
pub mod turns;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use db::{MessageStore, MessagesDb};
pub use error::{MessagesError, Result};
pub use models::{AggregateSentimentStats, MessageFilter, MessageRecord, PromptCompletionPair, SentimentCategory};
pub use sentiment::SentimentAnalyzer;
pub use service::MessageService;
pub use turns::{TimeWindow, TurnAggregator};
