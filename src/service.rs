//! Orchestration of the reporting and training-pair operations
//!
//! [`MessageService`] is built once per invocation from an injected store,
//! a sentiment analyzer and a turn aggregator. It holds no other state.

use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::db::MessageStore;
use crate::error::Result;
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{
    AggregateSentimentStats, ContactEntry, ContactMessageCount, MessageFilter, MessageRecord, PromptCompletionPair,
    ScoredMessage,
};
use crate::sentiment::{aggregate_compound_scores, category_from_compound, SentimentAnalyzer};
use crate::turns::TurnAggregator;

/// Entry point for every user-facing query
pub struct MessageService {
    store: Box<dyn MessageStore>,
    analyzer: SentimentAnalyzer,
    aggregator: TurnAggregator,
    metrics: MetricsCollector,
}

impl MessageService {
    /// Wire up a service from its collaborators
    #[must_use]
    pub fn new(store: Box<dyn MessageStore>, analyzer: SentimentAnalyzer, aggregator: TurnAggregator) -> Self {
        Self {
            store,
            analyzer,
            aggregator,
            metrics: MetricsCollector::default(),
        }
    }

    /// Whether names can be resolved and filtered on
    #[must_use]
    pub fn has_contact_directory(&self) -> bool {
        self.store.has_contact_directory()
    }

    /// Number of distinct conversations in the store
    pub fn total_distinct_conversations(&self) -> Result<i64> {
        let timer = OperationTimer::new("total_distinct_conversations");
        let total = self.tracked("convos", self.store.total_distinct_conversations())?;
        timer.finish();
        Ok(total)
    }

    /// The `limit` conversations with the most messages
    pub fn top_contacts(&self, limit: usize) -> Result<Vec<ContactMessageCount>> {
        let timer = OperationTimer::new("top_contacts");
        let contacts = self.tracked("contacts", self.store.message_counts_by_contact(Some(limit)))?;
        timer.finish();
        Ok(contacts)
    }

    /// Every one-on-one conversation partner
    pub fn all_contacts(&self) -> Result<Vec<ContactEntry>> {
        let timer = OperationTimer::new("all_contacts");
        let contacts = self.tracked("contacts", self.store.all_contacts())?;
        timer.finish();
        Ok(contacts)
    }

    /// Messages matching `filter`, each labelled from its score, plus the
    /// aggregate over the whole result set.
    ///
    /// Absent text scores zero here and is labelled neutral.
    #[instrument(skip(self), fields(subject = filter.subject()))]
    pub fn get_messages(&self, filter: &MessageFilter) -> Result<(Vec<ScoredMessage>, AggregateSentimentStats)> {
        filter.validate_for_get()?;
        let timer = OperationTimer::new("get_messages");

        let records = self.fetch("get", || self.store.fetch_messages(filter))?;

        let mut compounds = Vec::with_capacity(records.len());
        let mut scored = Vec::with_capacity(records.len());
        for record in records {
            let compound = self.analyzer.analyze(record.text.as_deref()).compound;
            self.metrics.record_sentiment(compound);
            compounds.push(compound);
            scored.push(ScoredMessage {
                sentiment: category_from_compound(compound),
                record,
            });
        }

        let stats = aggregate_compound_scores(&compounds);
        info!(
            messages = scored.len(),
            mean_compound = stats.mean_compound,
            category = %stats.category,
            "Scored messages"
        );
        timer.finish();
        Ok((scored, stats))
    }

    /// Messages containing `text`, optionally scoped by `filter`.
    ///
    /// Absent text is labelled unknown rather than scored.
    #[instrument(skip(self, text), fields(subject = filter.subject()))]
    pub fn search_messages(&self, text: &str, filter: &MessageFilter) -> Result<Vec<ScoredMessage>> {
        filter.validate_for_search()?;
        let timer = OperationTimer::new("search_messages");

        let records = self.fetch("search", || self.store.search_messages(text, filter))?;
        let scored: Vec<ScoredMessage> = records
            .into_iter()
            .map(|record| ScoredMessage {
                sentiment: self.analyzer.categorize_message(record.text.as_deref()),
                record,
            })
            .collect();

        info!(matches = scored.len(), "Search completed");
        timer.finish();
        Ok(scored)
    }

    /// Training pairs for one conversation partner.
    ///
    /// The filter's limit caps the fetched messages, not the pairs.
    #[instrument(skip(self), fields(subject = filter.subject(), window = %self.aggregator.time_window()))]
    pub fn generate_prompt_completion(&self, filter: &MessageFilter) -> Result<Vec<PromptCompletionPair>> {
        filter.validate_for_generate()?;
        let timer = OperationTimer::new("generate_prompt_completion");

        let records = self.fetch("generate", || self.store.fetch_messages(filter))?;
        let pairs = self.aggregator.aggregate(&records);
        self.metrics.record_pairs_generated(pairs.len());

        if pairs.is_empty() && !records.is_empty() {
            warn!(messages = records.len(), "No complete call-and-response turns found");
        }
        info!(messages = records.len(), pairs = pairs.len(), "Generated training pairs");
        timer.finish();
        Ok(pairs)
    }

    fn fetch<F>(&self, operation: &'static str, query: F) -> Result<Vec<MessageRecord>>
    where
        F: FnOnce() -> Result<Vec<MessageRecord>>,
    {
        let start = Instant::now();
        let records = self.tracked(operation, query())?;
        self.metrics.record_fetch(operation, records.len(), start.elapsed());
        Ok(records)
    }

    fn tracked<T>(&self, operation: &'static str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!(operation, error = %e, "Store query failed");
            self.metrics.record_error(operation);
        }
        result
    }
}
