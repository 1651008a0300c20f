//! File writing utilities for training pairs and message exports.
//!
//! Training pairs are written as JSON Lines, one `{"prompt", "completion"}`
//! object per line. Message reports can be exported to CSV.

use crate::error::Result;
use crate::metrics::MetricsCollector;
use crate::models::{PromptCompletionPair, ScoredMessage, STORE_TIMESTAMP_FORMAT};
use chrono::{Local, NaiveDateTime};
use csv::Writer;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File stem used when no contact identifier is available
pub const DEFAULT_IDENTIFIER: &str = "model_identifier";

/// Timestamp embedded in training file names
const FILE_TIMESTAMP_FORMAT: &str = "%m_%d_%Y_%H_%M_%S";

/// Name of the training file for `identifier` created at `created`.
///
/// Path separators and other characters that are unsafe in file names are
/// replaced with underscores.
#[must_use]
pub fn training_file_name(identifier: Option<&str>, created: NaiveDateTime) -> String {
    let stem = identifier
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_IDENTIFIER);
    let safe: String = stem
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') { '_' } else { c })
        .collect();
    format!("{safe}.{}.jsonl", created.format(FILE_TIMESTAMP_FORMAT))
}

/// Write training pairs to a new JSONL file in `output_dir`.
///
/// # Arguments
///
/// * `pairs` - Completed prompt/completion pairs, in emission order
/// * `output_dir` - Directory to create the file in; created if missing
/// * `identifier` - Contact name or number the pairs were generated for
///
/// # Returns
///
/// Path of the created file
pub fn write_training_pairs(
    pairs: &[PromptCompletionPair],
    output_dir: &Path,
    identifier: Option<&str>,
) -> Result<PathBuf> {
    create_dir_all(output_dir)?;
    let file_path = output_dir.join(training_file_name(identifier, Local::now().naive_local()));

    let file = File::create(&file_path)?;
    let mut writer = BufWriter::new(file);
    write_jsonl(pairs, &mut writer)?;
    writer.flush()?;

    MetricsCollector::default().record_export("jsonl");
    info!(pairs = pairs.len(), path = %file_path.display(), "Wrote training pairs");
    Ok(file_path)
}

/// Serialize pairs as JSON Lines into any writer
pub fn write_jsonl<W: Write>(pairs: &[PromptCompletionPair], writer: &mut W) -> Result<()> {
    for pair in pairs {
        serde_json::to_writer(&mut *writer, pair)?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Write scored messages to a CSV file.
///
/// Includes header row: `ID, Date, Identifier, Name, Message, Sentiment, FromMe`
pub fn write_messages_csv(messages: &[ScoredMessage], file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    let file = File::create(file_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["ID", "Date", "Identifier", "Name", "Message", "Sentiment", "FromMe"])?;

    for (i, message) in messages.iter().enumerate() {
        let record = &message.record;
        let id = (i + 1).to_string();
        let date = record.timestamp.format(STORE_TIMESTAMP_FORMAT).to_string();
        writer.write_record([
            id.as_str(),
            date.as_str(),
            record.counterpart_identifier.as_str(),
            record.display_name.as_deref().unwrap_or_default(),
            record.text_or_empty(),
            message.sentiment.as_str(),
            if record.is_from_me { "1" } else { "0" },
        ])?;
    }

    writer.flush()?;
    MetricsCollector::default().record_export("csv");
    info!(rows = messages.len(), path = %file_path.display(), "Exported messages to CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_training_file_name() {
        let created = NaiveDate::from_ymd_opt(2023, 3, 9)
            .and_then(|d| d.and_hms_opt(7, 5, 1))
            .expect("valid timestamp");
        assert_eq!(
            training_file_name(Some("5135550100"), created),
            "5135550100.03_09_2023_07_05_01.jsonl"
        );
        assert_eq!(
            training_file_name(None, created),
            "model_identifier.03_09_2023_07_05_01.jsonl"
        );
        assert_eq!(
            training_file_name(Some("a/b"), created),
            "a_b.03_09_2023_07_05_01.jsonl"
        );
    }

    #[test]
    fn test_jsonl_escapes_quotes() {
        let mut out = Vec::new();
        write_jsonl(&[PromptCompletionPair::new("say \"hi\"", "ok")], &mut out).expect("writable");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "{\"prompt\":\"say \\\"hi\\\"\",\"completion\":\"ok\"}\n"
        );
    }
}
