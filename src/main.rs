use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use message_insights::config::AppConfig;
use message_insights::db::MessagesDb;
use message_insights::file_writer::{write_messages_csv, write_training_pairs};
use message_insights::logging::init_logging;
use message_insights::metrics::MetricsCollector;
use message_insights::models::MessageFilter;
use message_insights::printer::Printer;
use message_insights::sentiment::SentimentAnalyzer;
use message_insights::service::MessageService;
use message_insights::turns::TimeWindow;
use message_insights::validation::InputValidator;

#[derive(Parser)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Conversation statistics
    #[command(arg_required_else_help = true)]
    Convos {
        /// List the number of distinct conversations
        #[arg(short, long)]
        total_number: bool,
    },
    /// Contact information
    #[command(arg_required_else_help = true)]
    Contacts {
        /// List the top n people the user has chatted with
        #[arg(short, long, conflicts_with = "list")]
        top_n_contacts: Option<usize>,

        /// List all contacts
        #[arg(short, long)]
        list: bool,
    },
    /// Search messages by text, optionally for one contact
    #[command(arg_required_else_help = true)]
    Search {
        /// Text to look for
        search_text: String,

        /// Name of the contact to search
        #[arg(short, long, conflicts_with = "number")]
        contact: Option<String>,

        /// Number of the contact to search
        #[arg(short, long)]
        number: Option<String>,

        /// Maximum number of results
        #[arg(short, long = "limit-number")]
        limit: Option<usize>,

        /// Also write the results to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Dump messages for a contact, a number or a day, with sentiment
    #[command(arg_required_else_help = true)]
    Get {
        /// Name of the contact
        #[arg(short, long, conflicts_with = "number")]
        contact: Option<String>,

        /// Number of the contact
        #[arg(short, long)]
        number: Option<String>,

        /// Day to retrieve messages for (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// Maximum number of results
        #[arg(short, long = "limit-number")]
        limit: Option<usize>,

        /// Also write the results to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Generate a JSONL prompt/completion training file for one contact
    #[command(arg_required_else_help = true)]
    Generate {
        /// Name of the contact
        #[arg(short, long, conflicts_with = "number")]
        contact: Option<String>,

        /// Number of the contact
        #[arg(short, long)]
        number: Option<String>,

        /// Maximum number of messages to scan; full history if omitted
        #[arg(short, long = "limit-number")]
        limit: Option<usize>,

        /// How the same-sender merge window is measured (legacy or elapsed)
        #[arg(long)]
        time_window: Option<TimeWindow>,

        /// Directory for the training file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    let log_file = config.logging.file_path.as_deref().map(Path::new);
    let _log_guard = init_logging(
        Some(&config.get_log_level()),
        config.logging.log_format()?,
        log_file,
    )?;

    if let Err(e) = MetricsCollector::init() {
        warn!("Metrics recorder not installed: {}", e);
    }

    info!("Starting messages");

    let messages_path = config.database.messages_db_path();
    InputValidator::validate_messages_db_path(&messages_path)
        .context("Set MESSAGES_DB_PATH or database.messages_path to a readable chat.db")?;
    let db = MessagesDb::from_config(&config.database)?;

    let aggregator = match &cli.command {
        Commands::Generate {
            time_window: Some(window),
            ..
        } => config.generate.aggregator()?.with_time_window(*window),
        _ => config.generate.aggregator()?,
    };

    let service = MessageService::new(Box::new(db), SentimentAnalyzer::default(), aggregator);
    let printer = Printer::new(config.mask_pii(), config.scramble_text());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Process command
    match cli.command {
        Commands::Convos { total_number } => {
            if total_number {
                let total = service.total_distinct_conversations()?;
                writeln!(out, "Total number of distinct conversations: {total}")?;
            }
        },
        Commands::Contacts { top_n_contacts, list } => {
            if let Some(n) = top_n_contacts {
                InputValidator::validate_limit(n)?;
                let results = service.top_contacts(n)?;
                printer.print_total_messages(&mut out, &results)?;
            } else if list {
                let results = service.all_contacts()?;
                printer.print_all_contacts(&mut out, &results)?;
            }
        },
        Commands::Search {
            search_text,
            contact,
            number,
            limit,
            export,
        } => {
            InputValidator::validate_search_text(&search_text)?;
            let filter = build_filter(contact, number, None, limit)?;
            debug!(?filter, "Searching messages");

            let results = service.search_messages(&search_text, &filter)?;
            printer.print_messages(&mut out, &results)?;
            if let Some(path) = export {
                write_messages_csv(&results, &path)?;
                writeln!(out, "Exported {} messages to {}", results.len(), path.display())?;
            }
        },
        Commands::Get {
            contact,
            number,
            date,
            limit,
            export,
        } => {
            let filter = build_filter(contact, number, date.as_deref(), limit)?;
            let (results, stats) = service.get_messages(&filter)?;
            printer.print_messages(&mut out, &results)?;
            printer.print_aggregate_sentiment(&mut out, &stats)?;
            if let Some(path) = export {
                write_messages_csv(&results, &path)?;
                writeln!(out, "Exported {} messages to {}", results.len(), path.display())?;
            }
        },
        Commands::Generate {
            contact,
            number,
            limit,
            output_dir,
            ..
        } => {
            let filter = build_filter(contact, number, None, limit)?;
            let output_dir =
                output_dir.unwrap_or_else(|| PathBuf::from(&config.generate.output_directory));
            InputValidator::validate_output_dir(&output_dir)?;

            let pairs = service.generate_prompt_completion(&filter)?;
            let path = write_training_pairs(&pairs, &output_dir, filter.subject())?;
            writeln!(out, "Wrote {} training pairs to {}", pairs.len(), path.display())?;
        },
    }

    out.flush()?;
    Ok(())
}

/// Validate raw CLI filter arguments and build the query filter
fn build_filter(
    contact: Option<String>,
    number: Option<String>,
    date: Option<&str>,
    limit: Option<usize>,
) -> Result<MessageFilter> {
    let mut filter = MessageFilter::new();

    if let Some(name) = contact {
        InputValidator::validate_contact_name(&name)?;
        filter = filter.with_name(name.trim());
    }
    if let Some(number) = number {
        filter = filter.with_number(InputValidator::validate_identifier(&number)?);
    }
    if let Some(date) = date {
        filter = filter.with_date(InputValidator::parse_date(date)?);
    }
    if let Some(limit) = limit {
        InputValidator::validate_limit(limit)?;
        filter = filter.with_limit(limit);
    }

    Ok(filter)
}
