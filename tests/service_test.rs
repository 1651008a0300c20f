//! `MessageService` against a mocked message store

use chrono::{Duration, NaiveDate, NaiveDateTime};
use message_insights::db::MessageStore;
use message_insights::error::{MessagesError, Result};
use message_insights::models::{
    ContactEntry, ContactMessageCount, MessageFilter, MessageRecord, PromptCompletionPair, SentimentCategory,
    SentimentScores,
};
use message_insights::sentiment::{SentimentAnalyzer, SentimentModel};
use message_insights::service::MessageService;
use message_insights::turns::{TimeWindow, TurnAggregator};
use mockall::mock;
use mockall::predicate::eq;

mock! {
    pub Store {}

    impl MessageStore for Store {
        fn has_contact_directory(&self) -> bool;
        fn total_distinct_conversations(&self) -> Result<i64>;
        fn message_counts_by_contact(&self, limit: Option<usize>) -> Result<Vec<ContactMessageCount>>;
        fn all_contacts(&self) -> Result<Vec<ContactEntry>>;
        fn fetch_messages(&self, filter: &MessageFilter) -> Result<Vec<MessageRecord>>;
        fn search_messages(&self, text: &str, filter: &MessageFilter) -> Result<Vec<MessageRecord>>;
    }
}

/// Scores by keyword so expectations stay independent of the lexicon
struct KeywordModel;

impl SentimentModel for KeywordModel {
    fn polarity_scores(&self, text: &str) -> SentimentScores {
        let compound = if text.contains("yay") {
            0.9
        } else if text.contains("boo") {
            -0.6
        } else {
            0.0
        };
        SentimentScores {
            compound,
            ..SentimentScores::empty()
        }
    }
}

fn at(minutes: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 9, 1)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .expect("valid timestamp")
        + Duration::minutes(minutes)
}

fn record(minutes: i64, text: Option<&str>, from_me: bool) -> MessageRecord {
    MessageRecord {
        timestamp: at(minutes),
        text: text.map(ToString::to_string),
        is_from_me: from_me,
        counterpart_identifier: "+15135550100".to_string(),
        display_name: Some("Alice Smith".to_string()),
    }
}

fn service(store: MockStore) -> MessageService {
    MessageService::new(
        Box::new(store),
        SentimentAnalyzer::new(Box::new(KeywordModel)),
        TurnAggregator::new(TimeWindow::Legacy),
    )
}

#[test]
fn test_get_messages_scores_and_aggregates() {
    let filter = MessageFilter::new().with_number("0100");
    let mut store = MockStore::new();
    store
        .expect_fetch_messages()
        .with(eq(filter.clone()))
        .times(1)
        .returning(|_| {
            Ok(vec![
                record(0, Some("yay"), true),
                record(1, None, false),
                record(2, Some("ok"), false),
            ])
        });

    let (messages, stats) = service(store).get_messages(&filter).expect("get");

    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].sentiment, SentimentCategory::Positive);
    // Absent text is scored as zero here, not reported as unknown.
    assert_eq!(messages[1].sentiment, SentimentCategory::Neutral);
    assert_eq!(messages[2].sentiment, SentimentCategory::Neutral);
    assert!((stats.mean_compound - 0.3).abs() < 1e-9);
    assert_eq!(stats.category, SentimentCategory::Positive);
}

#[test]
fn test_get_messages_empty_result() {
    let mut store = MockStore::new();
    store.expect_fetch_messages().returning(|_| Ok(Vec::new()));

    let date = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");
    let (messages, stats) = service(store)
        .get_messages(&MessageFilter::new().with_date(date))
        .expect("get");

    assert!(messages.is_empty());
    assert_eq!(stats.mean_compound, 0.0);
    assert_eq!(stats.category, SentimentCategory::Unknown);
}

#[test]
fn test_get_messages_rejects_unscoped_filter() {
    let mut store = MockStore::new();
    store.expect_fetch_messages().never();

    let err = service(store).get_messages(&MessageFilter::new()).unwrap_err();
    assert!(matches!(err, MessagesError::InvalidFilter(_)));
}

#[test]
fn test_number_and_name_are_exclusive() {
    let mut store = MockStore::new();
    store.expect_fetch_messages().never();
    store.expect_search_messages().never();
    let service = service(store);

    let both = MessageFilter::new().with_number("0100").with_name("Alice");
    assert!(service.get_messages(&both).is_err());
    assert!(service.search_messages("hi", &both).is_err());
    assert!(service.generate_prompt_completion(&both).is_err());
}

#[test]
fn test_search_labels_absent_text_unknown() {
    let mut store = MockStore::new();
    store
        .expect_search_messages()
        .withf(|text, filter| text == "boo" && filter.number.is_none())
        .returning(|_, _| Ok(vec![record(0, Some("boo hoo"), false), record(1, None, false)]));

    let results = service(store)
        .search_messages("boo", &MessageFilter::new())
        .expect("search");

    assert_eq!(results[0].sentiment, SentimentCategory::Negative);
    assert_eq!(results[1].sentiment, SentimentCategory::Unknown);
}

#[test]
fn test_generate_prompt_completion() {
    let mut store = MockStore::new();
    store.expect_fetch_messages().returning(|_| {
        Ok(vec![
            record(0, Some("hi"), true),
            record(1, Some("hey"), false),
            record(2, Some("how are you"), true),
            record(3, Some("good"), false),
            record(4, Some("bye"), true),
        ])
    });

    let pairs = service(store)
        .generate_prompt_completion(&MessageFilter::new().with_name("Alice"))
        .expect("generate");

    assert_eq!(
        pairs,
        vec![
            PromptCompletionPair::new("hi", "hey"),
            PromptCompletionPair::new("how are you", "good"),
        ]
    );
}

#[test]
fn test_generate_requires_a_counterpart() {
    let mut store = MockStore::new();
    store.expect_fetch_messages().never();

    let date = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");
    let err = service(store)
        .generate_prompt_completion(&MessageFilter::new().with_date(date))
        .unwrap_err();
    assert!(matches!(err, MessagesError::InvalidFilter(_)));
}

#[test]
fn test_store_errors_propagate() {
    let mut store = MockStore::new();
    store
        .expect_fetch_messages()
        .returning(|f| Err(MessagesError::DirectoryUnavailable(f.name.clone().unwrap_or_default())));

    let err = service(store)
        .get_messages(&MessageFilter::new().with_name("Alice"))
        .unwrap_err();
    assert!(matches!(err, MessagesError::DirectoryUnavailable(name) if name == "Alice"));
}

#[test]
fn test_contact_reports_pass_through() {
    let mut store = MockStore::new();
    store.expect_total_distinct_conversations().returning(|| Ok(42));
    store
        .expect_message_counts_by_contact()
        .with(eq(Some(1)))
        .returning(|_| {
            Ok(vec![ContactMessageCount {
                identifier: "+15135550100".to_string(),
                message_count: 1200,
                display_name: Some("Alice Smith".to_string()),
            }])
        });
    store.expect_all_contacts().returning(|| Ok(Vec::new()));
    store.expect_has_contact_directory().return_const(true);

    let service = service(store);
    assert_eq!(service.total_distinct_conversations().expect("count"), 42);
    assert_eq!(service.top_contacts(1).expect("top")[0].message_count, 1200);
    assert!(service.all_contacts().expect("contacts").is_empty());
    assert!(service.has_contact_directory());
}
