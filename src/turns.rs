//! Conversation turn aggregation
//!
//! Turns one counterpart's chronological message stream into prompt/completion
//! training pairs. Consecutive messages from the same side are coalesced, the
//! local user's side becomes the prompt and the counterpart's the completion.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::models::{MessageRecord, PromptCompletionPair};

/// Default coalescing window in minutes
pub const DEFAULT_MERGE_WINDOW_MINUTES: i64 = 30;

/// Appended after every merged message
const MERGE_SEPARATOR: &str = ". ";

/// Strip surrounding whitespace and line breaks, optionally dropping
/// everything outside 7-bit ASCII.
///
/// Absent text normalizes to the empty string. Applying the function twice
/// gives the same result as applying it once.
#[must_use]
pub fn normalize_text(text: Option<&str>, strip_non_ascii: bool) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let cleaned: String = text
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .filter(|c| !strip_non_ascii || c.is_ascii())
        .collect();

    cleaned.trim().to_string()
}

/// Whole minutes between two timestamps, order independent
#[must_use]
pub fn minutes_between(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    (b - a).num_minutes().abs()
}

/// How the same-sender coalescing window is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    /// Historical behavior: the previous message is compared with itself, so
    /// the elapsed time is always zero and any same-sender run is merged.
    /// Existing training files depend on this; use `Elapsed` for real gaps
    /// instead of changing it.
    #[default]
    Legacy,
    /// Compare the previous message with the current one.
    Elapsed,
}

impl TimeWindow {
    /// Config/CLI spelling
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Elapsed => "elapsed",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "elapsed" => Ok(Self::Elapsed),
            other => Err(format!("unknown time window mode '{other}', expected legacy or elapsed")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PreviousMessage {
    timestamp: NaiveDateTime,
    is_from_me: bool,
}

/// Fold state threaded through the message sequence
#[derive(Debug, Default)]
struct TurnState {
    running: PromptCompletionPair,
    previous: Option<PreviousMessage>,
    emitted: Vec<PromptCompletionPair>,
}

/// Groups a conversation into call-and-response pairs
#[derive(Debug, Clone, Copy)]
pub struct TurnAggregator {
    time_window: TimeWindow,
    merge_window_minutes: i64,
    strip_non_ascii: bool,
}

impl Default for TurnAggregator {
    fn default() -> Self {
        Self::new(TimeWindow::Legacy)
    }
}

impl TurnAggregator {
    /// Aggregator with the default 30 minute window and ASCII cleansing
    #[must_use]
    pub const fn new(time_window: TimeWindow) -> Self {
        Self {
            time_window,
            merge_window_minutes: DEFAULT_MERGE_WINDOW_MINUTES,
            strip_non_ascii: true,
        }
    }

    /// Switch how the coalescing window is measured
    #[must_use]
    pub const fn with_time_window(mut self, time_window: TimeWindow) -> Self {
        self.time_window = time_window;
        self
    }

    /// Override the coalescing window
    #[must_use]
    pub const fn with_merge_window(mut self, minutes: i64) -> Self {
        self.merge_window_minutes = minutes;
        self
    }

    /// Keep or drop non-ASCII characters during normalization
    #[must_use]
    pub const fn with_strip_non_ascii(mut self, strip: bool) -> Self {
        self.strip_non_ascii = strip;
        self
    }

    /// Active window mode
    #[must_use]
    pub const fn time_window(&self) -> TimeWindow {
        self.time_window
    }

    /// Build the training pairs for one conversation.
    ///
    /// `messages` must be in ascending timestamp order. A trailing pair that
    /// only has one side filled in is dropped.
    #[must_use]
    pub fn aggregate(&self, messages: &[MessageRecord]) -> Vec<PromptCompletionPair> {
        let state = messages
            .iter()
            .fold(TurnState::default(), |state, message| self.step(state, message));

        if !state.running.prompt.is_empty() || !state.running.completion.is_empty() {
            debug!(
                prompt_len = state.running.prompt.len(),
                completion_len = state.running.completion.len(),
                "Discarding incomplete trailing pair"
            );
        }
        debug!(
            messages = messages.len(),
            pairs = state.emitted.len(),
            window = %self.time_window,
            "Aggregated conversation turns"
        );
        state.emitted
    }

    fn should_merge(&self, previous: PreviousMessage, current: &MessageRecord) -> bool {
        if previous.is_from_me != current.is_from_me {
            return false;
        }

        let elapsed = match self.time_window {
            // Always 0.
            TimeWindow::Legacy => minutes_between(previous.timestamp, previous.timestamp),
            TimeWindow::Elapsed => minutes_between(previous.timestamp, current.timestamp),
        };

        elapsed < self.merge_window_minutes
    }

    fn step(&self, state: TurnState, message: &MessageRecord) -> TurnState {
        let TurnState {
            mut running,
            previous,
            mut emitted,
        } = state;

        let text = normalize_text(message.text.as_deref(), self.strip_non_ascii);
        let merge = previous.is_some_and(|p| self.should_merge(p, message));

        let side = if message.is_from_me {
            &mut running.prompt
        } else {
            &mut running.completion
        };

        if merge {
            trace!(from_me = message.is_from_me, "Merging message into current turn");
            side.push_str(&text);
            side.push_str(MERGE_SEPARATOR);
        } else {
            *side = text;
            if running.is_complete() {
                emitted.push(std::mem::take(&mut running));
            }
        }

        TurnState {
            running,
            previous: Some(PreviousMessage {
                timestamp: message.timestamp,
                is_from_me: message.is_from_me,
            }),
            emitted,
        }
    }
}
