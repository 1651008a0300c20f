//! Unit tests for metrics.rs module

use message_insights::logging::OperationTimer;
use message_insights::metrics::MetricsCollector;
use std::time::Duration;

#[test]
fn test_metrics_collector_default_names() {
    let collector = MetricsCollector::default();
    assert_eq!(collector.messages_fetched_total, "messages_fetched_total");
    assert_eq!(collector.query_duration, "messages_query_duration_seconds");
    assert_eq!(collector.records_scored_total, "messages_records_scored_total");
    assert_eq!(collector.compound_scores, "messages_compound_scores");
    assert_eq!(collector.pairs_generated_total, "messages_pairs_generated_total");
    assert_eq!(collector.errors_total, "messages_errors_total");
}

#[test]
fn test_metrics_initialization_is_once_only() {
    // The first install wins; a second one is reported rather than panicking.
    let _ = MetricsCollector::init();
    assert!(MetricsCollector::init().is_err());
}

#[test]
fn test_recording_is_infallible() {
    let collector = MetricsCollector::default();
    collector.record_fetch("get", 0, Duration::ZERO);
    collector.record_fetch("search", 250, Duration::from_millis(12));
    collector.record_sentiment(-0.7);
    collector.record_pairs_generated(0);
    collector.record_export("jsonl");
    collector.record_error("generate");
}

#[test]
fn test_operation_timer_reports_elapsed() {
    let timer = OperationTimer::new("sleep");
    std::thread::sleep(Duration::from_millis(5));
    assert!(timer.finish() >= 5);
}
