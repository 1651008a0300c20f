use anyhow::Result;
use metrics::{counter, histogram};
use std::time::Duration;

/// Metrics collection and management
pub struct MetricsCollector {
    /// Messages returned by the store
    pub messages_fetched_total: &'static str,
    /// Store query latency
    pub query_duration: &'static str,
    /// Messages passed through the sentiment scorer
    pub records_scored_total: &'static str,
    /// Distribution of per-message compound scores
    pub compound_scores: &'static str,
    /// Training pairs emitted by the turn aggregator
    pub pairs_generated_total: &'static str,
    /// Files written by the export operations
    pub export_files_created_total: &'static str,
    /// Failed operations
    pub errors_total: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            messages_fetched_total: "messages_fetched_total",
            query_duration: "messages_query_duration_seconds",
            records_scored_total: "messages_records_scored_total",
            compound_scores: "messages_compound_scores",
            pairs_generated_total: "messages_pairs_generated_total",
            export_files_created_total: "messages_export_files_created_total",
            errors_total: "messages_errors_total",
        }
    }
}

impl MetricsCollector {
    /// Initialize metrics collection
    pub fn init() -> Result<()> {
        metrics::set_global_recorder(metrics::NoopRecorder)
            .map_err(|e| anyhow::anyhow!("Failed to initialize metrics recorder: {}", e))?;

        Ok(())
    }

    /// Record a store query and how many messages it returned
    pub fn record_fetch(&self, operation: &'static str, count: usize, duration: Duration) {
        counter!(self.messages_fetched_total, "operation" => operation).increment(count as u64);
        histogram!(self.query_duration, "operation" => operation).record(duration.as_secs_f64());
    }

    /// Record one scored message
    pub fn record_sentiment(&self, compound: f64) {
        counter!(self.records_scored_total).increment(1);
        histogram!(self.compound_scores).record(compound);
    }

    /// Record the output of one turn aggregation
    pub fn record_pairs_generated(&self, count: usize) {
        counter!(self.pairs_generated_total).increment(count as u64);
    }

    /// Record a written export file
    pub fn record_export(&self, format: &'static str) {
        counter!(self.export_files_created_total, "format" => format).increment(1);
    }

    /// Record error metrics
    pub fn record_error(&self, operation: &'static str) {
        counter!(self.errors_total, "operation" => operation).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::default();
        assert_eq!(collector.messages_fetched_total, "messages_fetched_total");
        assert_eq!(collector.pairs_generated_total, "messages_pairs_generated_total");
    }

    #[test]
    fn test_recording_without_recorder_is_harmless() {
        let collector = MetricsCollector::default();
        collector.record_fetch("get", 3, Duration::from_millis(2));
        collector.record_sentiment(0.4);
        collector.record_pairs_generated(2);
        collector.record_error("search");
    }
}
