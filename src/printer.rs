//! Terminal tables for query results
//!
//! Rendering goes through any [`Write`] sink so reports can be captured in
//! tests; the binary hands in a locked stdout.

use std::io::{self, Write};

use crate::models::{AggregateSentimentStats, ContactEntry, ContactMessageCount, ScoredMessage, STORE_TIMESTAMP_FORMAT};
use crate::privacy::{maybe_mask_name, maybe_mask_phone_number, maybe_scramble_text};
use crate::turns::normalize_text;

const IDX_WIDTH: usize = 5;
const DATE_WIDTH: usize = 20;
const CONTACT_WIDTH: usize = 40;
const MESSAGE_WIDTH: usize = 75;
const SENTIMENT_WIDTH: usize = 10;
const RANK_NAME_WIDTH: usize = 50;
const NUMBER_WIDTH: usize = 20;
const BANNER_WIDTH: usize = 50;

/// A column heading, optionally centred in a fixed width
#[derive(Debug, Clone, Copy)]
pub enum Column<'a> {
    /// Heading printed as is
    Plain(&'a str),
    /// Heading centred in the given width
    Fixed(&'a str, usize),
}

/// Writes result tables with optional PII masking
#[derive(Debug, Clone, Copy, Default)]
pub struct Printer {
    mask_pii: bool,
    scramble_text: bool,
}

impl Printer {
    /// Printer applying the given masking options
    #[must_use]
    pub const fn new(mask_pii: bool, scramble_text: bool) -> Self {
        Self { mask_pii, scramble_text }
    }

    /// Title row followed by a dashed rule of the same width
    pub fn show_title<W: Write>(&self, out: &mut W, columns: &[Column<'_>]) -> io::Result<()> {
        let mut title = columns
            .iter()
            .map(|column| match column {
                Column::Plain(name) => format!("{name} | "),
                Column::Fixed(name, width) => format!("{name:^width$}| "),
            })
            .collect::<String>();
        title.truncate(title.trim_end_matches([' ', '|']).len());

        writeln!(out, "{title}")?;
        writeln!(out, "{}", "-".repeat(title.chars().count()))
    }

    /// Rank, contact and message count
    pub fn print_total_messages<W: Write>(&self, out: &mut W, results: &[ContactMessageCount]) -> io::Result<()> {
        let count_heading = "Message Count";
        self.show_title(
            out,
            &[
                Column::Plain("Rank"),
                Column::Fixed("Name / Number", RANK_NAME_WIDTH),
                Column::Plain(count_heading),
            ],
        )?;

        let count_width = count_heading.len();
        for (idx, result) in results.iter().enumerate() {
            let contact = self.contact_label(result.display_name.as_deref(), &result.identifier);
            writeln!(
                out,
                "{:^IDX_WIDTH$}| {contact:^RANK_NAME_WIDTH$}| {:^count_width$}",
                idx + 1,
                group_thousands(result.message_count),
            )?;
        }
        Ok(())
    }

    /// Every one-on-one contact
    pub fn print_all_contacts<W: Write>(&self, out: &mut W, results: &[ContactEntry]) -> io::Result<()> {
        self.show_title(
            out,
            &[
                Column::Fixed("Idx", IDX_WIDTH),
                Column::Fixed("Number", NUMBER_WIDTH),
                Column::Fixed("Name", RANK_NAME_WIDTH),
            ],
        )?;

        for (idx, result) in results.iter().enumerate() {
            let number = maybe_mask_phone_number(&result.identifier, self.mask_pii);
            let name = maybe_mask_name(result.display_name.as_deref().unwrap_or_default(), self.mask_pii);
            writeln!(
                out,
                "{:^IDX_WIDTH$}| {number:^NUMBER_WIDTH$}| {name:^RANK_NAME_WIDTH$}",
                idx + 1
            )?;
        }
        Ok(())
    }

    /// Dated messages with their sentiment labels
    pub fn print_messages<W: Write>(&self, out: &mut W, results: &[ScoredMessage]) -> io::Result<()> {
        let sent_heading = "Sent (1) / Received (0)";
        self.show_title(
            out,
            &[
                Column::Fixed("Idx", IDX_WIDTH),
                Column::Fixed("Date", DATE_WIDTH),
                Column::Fixed("Name / Number", CONTACT_WIDTH),
                Column::Fixed("Message", MESSAGE_WIDTH),
                Column::Fixed("Sentiment", SENTIMENT_WIDTH),
                Column::Fixed(sent_heading, SENTIMENT_WIDTH),
            ],
        )?;

        // Index, date and contact columns plus their separators.
        let message_column_start = IDX_WIDTH + DATE_WIDTH + CONTACT_WIDTH + 6;

        for (idx, result) in results.iter().enumerate() {
            let record = &result.record;
            let date = record.timestamp.format(STORE_TIMESTAMP_FORMAT).to_string();
            let contact = self.contact_label(record.display_name.as_deref(), &record.counterpart_identifier);

            let text = normalize_text(record.text.as_deref(), false);
            let text = maybe_scramble_text(&text, self.scramble_text);
            let text = if text.chars().count() > MESSAGE_WIDTH {
                wrap_column(&text, message_column_start, MESSAGE_WIDTH)
            } else {
                text
            };

            writeln!(
                out,
                "{:^IDX_WIDTH$}| {date:^DATE_WIDTH$}| {contact:^CONTACT_WIDTH$}| {text:<MESSAGE_WIDTH$}| {:^SENTIMENT_WIDTH$}| {:^SENTIMENT_WIDTH$}",
                idx + 1,
                result.sentiment.as_str(),
                u8::from(record.is_from_me),
            )?;
        }
        Ok(())
    }

    /// Banner with the mean compound score of a result set
    pub fn print_aggregate_sentiment<W: Write>(&self, out: &mut W, stats: &AggregateSentimentStats) -> io::Result<()> {
        let divider = "=".repeat(BANNER_WIDTH);
        writeln!(out, "{divider}")?;
        writeln!(
            out,
            "Overall sentiment: {} with a compound VADER score of {:.4}",
            stats.category, stats.mean_compound
        )?;
        writeln!(out, "{divider}")
    }

    fn contact_label(&self, name: Option<&str>, identifier: &str) -> String {
        let number = maybe_mask_phone_number(identifier, self.mask_pii);
        match name.filter(|n| !n.is_empty()) {
            Some(name) => format!("{} ({number})", maybe_mask_name(name, self.mask_pii)),
            None => number,
        }
    }
}

/// Break `text` into `width`-character lines; continuation lines are
/// indented to `indent` so they stay under the message column.
#[must_use]
pub fn wrap_column(text: &str, indent: usize, width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let padding = " ".repeat(indent);

    chars
        .chunks(width.max(1))
        .enumerate()
        .map(|(idx, chunk)| {
            let line: String = chunk.iter().collect();
            if idx == 0 {
                format!("{line:<width$}")
            } else {
                format!("{padding}{line:<width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("|\n")
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}
