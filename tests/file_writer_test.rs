//! Training-pair and CSV output files

use chrono::NaiveDate;
use message_insights::file_writer::{write_messages_csv, write_training_pairs, DEFAULT_IDENTIFIER};
use message_insights::models::{MessageRecord, PromptCompletionPair, ScoredMessage, SentimentCategory};
use tempfile::TempDir;

#[test]
fn test_write_training_pairs_jsonl() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let pairs = vec![
        PromptCompletionPair::new("hi", "hey"),
        PromptCompletionPair::new("she said \"no\"", "back\\slash"),
    ];

    let path = write_training_pairs(&pairs, dir.path(), Some("+15135550100")).expect("write");

    let file_name = path.file_name().and_then(|n| n.to_str()).expect("file name");
    assert!(file_name.starts_with("+15135550100."));
    assert!(path.extension().is_some_and(|ext| ext == "jsonl"));

    let contents = std::fs::read_to_string(&path).expect("read");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], r#"{"prompt":"hi","completion":"hey"}"#);

    let parsed: Vec<PromptCompletionPair> = lines
        .iter()
        .map(|line| serde_json::from_str(line).expect("valid JSON line"))
        .collect();
    assert_eq!(parsed, pairs);
}

#[test]
fn test_write_training_pairs_defaults_and_creates_dir() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let nested = dir.path().join("out").join("training");

    let path = write_training_pairs(&[], &nested, None).expect("write");

    assert!(nested.is_dir());
    let file_name = path.file_name().and_then(|n| n.to_str()).expect("file name");
    assert!(file_name.starts_with(DEFAULT_IDENTIFIER));
    assert_eq!(std::fs::read_to_string(&path).expect("read"), "");
}

#[test]
fn test_write_messages_csv() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("export.csv");
    let messages = vec![
        ScoredMessage {
            record: MessageRecord {
                timestamp: NaiveDate::from_ymd_opt(2023, 6, 15)
                    .and_then(|d| d.and_hms_opt(12, 0, 1))
                    .expect("valid timestamp"),
                text: Some("hello, world".to_string()),
                is_from_me: true,
                counterpart_identifier: "+15135550100".to_string(),
                display_name: Some("Alice Smith".to_string()),
            },
            sentiment: SentimentCategory::Neutral,
        },
        ScoredMessage {
            record: MessageRecord {
                timestamp: NaiveDate::from_ymd_opt(2023, 6, 15)
                    .and_then(|d| d.and_hms_opt(12, 5, 0))
                    .expect("valid timestamp"),
                text: None,
                is_from_me: false,
                counterpart_identifier: "+15135550100".to_string(),
                display_name: None,
            },
            sentiment: SentimentCategory::Unknown,
        },
    ];

    write_messages_csv(&messages, &path).expect("export");

    let mut reader = csv::Reader::from_path(&path).expect("open csv");
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["ID", "Date", "Identifier", "Name", "Message", "Sentiment", "FromMe"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("row")).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][1], "2023-06-15 12:00:01");
    assert_eq!(&rows[0][4], "hello, world");
    assert_eq!(&rows[0][6], "1");
    assert_eq!(&rows[1][3], "");
    assert_eq!(&rows[1][5], "unknown");
}
