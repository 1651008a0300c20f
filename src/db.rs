//! Read-only access to the Messages database
//!
//! [`MessagesDb`] wraps a single SQLite connection to `chat.db`, optionally
//! with the AddressBook database attached for resolving contact names. All
//! user-supplied values are bound as parameters; nothing is formatted into
//! the query text.

use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, params_from_iter, Connection, OpenFlags, Row, ToSql};
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::error::{MessagesError, Result};
use crate::models::{ContactEntry, ContactMessageCount, MessageFilter, MessageRecord, RawMessageRow, DATE_FORMAT};
use crate::schema::{
    chat, chat_message_join, directory_phone, directory_record, message, APPLE_EPOCH_OFFSET_SECS, DIRECTORY_ALIAS,
};

/// Query surface the reporting and training-pair operations depend on
pub trait MessageStore {
    /// Whether the contacts directory is attached and readable
    fn has_contact_directory(&self) -> bool;

    /// Number of distinct conversations
    fn total_distinct_conversations(&self) -> Result<i64>;

    /// Message totals per conversation, largest first
    fn message_counts_by_contact(&self, limit: Option<usize>) -> Result<Vec<ContactMessageCount>>;

    /// One-on-one conversation partners, ordered by name
    fn all_contacts(&self) -> Result<Vec<ContactEntry>>;

    /// Messages matching `filter`, oldest first
    fn fetch_messages(&self, filter: &MessageFilter) -> Result<Vec<MessageRecord>>;

    /// Messages containing `text` and matching `filter`, oldest first
    fn search_messages(&self, text: &str, filter: &MessageFilter) -> Result<Vec<MessageRecord>>;
}

/// Connection to `chat.db` with an optional attached contacts directory
pub struct MessagesDb {
    conn: Connection,
    directory: OnceCell<bool>,
}

impl MessagesDb {
    /// Open the messages database read-only
    pub fn open(messages_path: &Path) -> Result<Self> {
        if !messages_path.is_file() {
            return Err(MessagesError::Other(format!(
                "Cannot read the messages database at {}. Check the path and that this process has read access",
                messages_path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            messages_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI,
        )?;
        info!("Opened messages database at {}", messages_path.display());

        Ok(Self {
            conn,
            directory: OnceCell::new(),
        })
    }

    /// Open the databases named by the configuration.
    ///
    /// A missing or unattachable address book is logged and ignored; names
    /// are then simply not resolved.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let db = Self::open(&config.messages_db_path())?;

        match config.address_book_db_path() {
            Some(path) => {
                if let Err(e) = db.attach_directory(&path) {
                    warn!("Could not attach contacts directory {}: {e}", path.display());
                }
            },
            None => debug!("No contacts directory found; names will not be resolved"),
        }

        Ok(db)
    }

    /// Attach a contacts database under the directory alias
    pub fn attach_directory(&self, path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        self.conn
            .execute(&format!("ATTACH DATABASE ?1 AS {DIRECTORY_ALIAS}"), params![path_str])?;
        info!("Attached contacts directory {}", path.display());
        Ok(())
    }

    /// The largest regular file in `dir`, taken to be the live AddressBook database
    #[must_use]
    pub fn find_address_book(dir: &Path) -> Option<PathBuf> {
        let entries = fs::read_dir(dir).ok()?;
        entries
            .filter_map(std::result::Result::ok)
            .filter_map(|entry| {
                let metadata = entry.metadata().ok()?;
                metadata.is_file().then(|| (metadata.len(), entry.path()))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, path)| path)
    }

    fn probe_directory(&self) -> bool {
        let probe = format!(
            "SELECT 1 FROM {DIRECTORY_ALIAS}.{} LIMIT 1",
            directory_phone::TABLE
        );
        let available = self
            .conn
            .prepare(&probe)
            .and_then(|mut stmt| stmt.exists([]))
            .is_ok();
        debug!(available, "Probed contacts directory");
        available
    }

    fn name_expr(&self) -> String {
        if self.has_contact_directory() {
            directory_name_subquery()
        } else {
            "NULL".to_string()
        }
    }

    fn query_records(&self, sql: &str, params: &[Box<dyn ToSql>]) -> Result<Vec<MessageRecord>> {
        debug!(sql, "Running message query");
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), map_raw_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(MessageRecord::try_from(row?)?);
        }
        Ok(records)
    }

    fn message_query(&self, text: Option<&str>, filter: &MessageFilter) -> Result<(String, Vec<Box<dyn ToSql>>)> {
        let mut sql = format!(
            "WITH records AS (
                SELECT {date} AS message_date,
                       {msg}.{text_col} AS message_text,
                       {msg}.{from_me} AS is_from_me,
                       {chat}.{ident} AS chat_identifier,
                       {name} AS full_name,
                       {msg}.{raw_date} AS raw_date,
                       {msg}.{msg_rowid} AS message_rowid
                FROM {chat}
                JOIN {cmj} ON {chat}.{chat_rowid} = {cmj}.{cmj_chat}
                JOIN {msg} ON {cmj}.{cmj_msg} = {msg}.{msg_rowid}
            )
            SELECT message_date, message_text, is_from_me, chat_identifier, full_name
            FROM records
            WHERE 1 = 1",
            date = message_date_expr(),
            msg = message::TABLE,
            text_col = message::TEXT,
            from_me = message::IS_FROM_ME,
            raw_date = message::DATE,
            msg_rowid = message::ROWID,
            chat = chat::TABLE,
            ident = chat::CHAT_IDENTIFIER,
            chat_rowid = chat::ROWID,
            cmj = chat_message_join::TABLE,
            cmj_chat = chat_message_join::CHAT_ID,
            cmj_msg = chat_message_join::MESSAGE_ID,
            name = self.name_expr(),
        );
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(number) = &filter.number {
            sql.push_str(" AND chat_identifier LIKE '%' || ? ESCAPE '\\'");
            params.push(Box::new(escape_like(number)));
        }

        if let Some(name) = &filter.name {
            if !self.has_contact_directory() {
                return Err(MessagesError::DirectoryUnavailable(name.clone()));
            }
            sql.push_str(" AND full_name LIKE '%' || ? || '%' ESCAPE '\\'");
            params.push(Box::new(escape_like(name)));
        }

        if let Some(date) = filter.date {
            sql.push_str(" AND date(message_date) = ?");
            params.push(Box::new(date.format(DATE_FORMAT).to_string()));
        }

        if let Some(text) = text {
            sql.push_str(" AND message_text LIKE '%' || ? || '%' ESCAPE '\\'");
            params.push(Box::new(escape_like(text)));
        }

        sql.push_str(" ORDER BY raw_date ASC, message_rowid ASC");

        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit_param(limit)));
        }

        Ok((sql, params))
    }
}

impl MessageStore for MessagesDb {
    fn has_contact_directory(&self) -> bool {
        *self.directory.get_or_init(|| self.probe_directory())
    }

    fn total_distinct_conversations(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", chat::TABLE), [], |row| row.get(0))?;
        Ok(count)
    }

    fn message_counts_by_contact(&self, limit: Option<usize>) -> Result<Vec<ContactMessageCount>> {
        let mut sql = format!(
            "SELECT {chat}.{ident}, COUNT({msg}.{msg_rowid}) AS message_count, {name} AS full_name
             FROM {chat}
             JOIN {cmj} ON {chat}.{chat_rowid} = {cmj}.{cmj_chat}
             JOIN {msg} ON {cmj}.{cmj_msg} = {msg}.{msg_rowid}
             GROUP BY {chat}.{ident}
             ORDER BY message_count DESC, {chat}.{ident} ASC",
            chat = chat::TABLE,
            ident = chat::CHAT_IDENTIFIER,
            chat_rowid = chat::ROWID,
            msg = message::TABLE,
            msg_rowid = message::ROWID,
            cmj = chat_message_join::TABLE,
            cmj_chat = chat_message_join::CHAT_ID,
            cmj_msg = chat_message_join::MESSAGE_ID,
            name = self.name_expr(),
        );
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit_param(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(ContactMessageCount {
                identifier: row.get(0)?,
                message_count: row.get(1)?,
                display_name: row.get(2)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn all_contacts(&self) -> Result<Vec<ContactEntry>> {
        // Group chats use "chat…" identifiers; five character ids are short codes.
        let sql = format!(
            "SELECT {chat}.{ident}, {name} AS full_name
             FROM {chat}
             WHERE {chat}.{ident} NOT LIKE 'chat%'
               AND LENGTH({chat}.{ident}) != 5
             GROUP BY {chat}.{ident}
             ORDER BY full_name ASC, {chat}.{ident} ASC",
            chat = chat::TABLE,
            ident = chat::CHAT_IDENTIFIER,
            name = self.name_expr(),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(ContactEntry {
                identifier: row.get(0)?,
                display_name: row.get(1)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn fetch_messages(&self, filter: &MessageFilter) -> Result<Vec<MessageRecord>> {
        let (sql, params) = self.message_query(None, filter)?;
        self.query_records(&sql, &params)
    }

    fn search_messages(&self, text: &str, filter: &MessageFilter) -> Result<Vec<MessageRecord>> {
        let (sql, params) = self.message_query(Some(text), filter)?;
        self.query_records(&sql, &params)
    }
}

/// Read one positional row; a missing or mistyped column is an error
fn map_raw_row(row: &Row<'_>) -> rusqlite::Result<RawMessageRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

/// Local send time of a message as `YYYY-MM-DD HH:MM:SS`
fn message_date_expr() -> String {
    format!(
        "datetime({msg}.{date} / 1000000000 + {APPLE_EPOCH_OFFSET_SECS}, 'unixepoch', 'localtime')",
        msg = message::TABLE,
        date = message::DATE,
    )
}

/// First directory name whose digits end the chat identifier, or NULL
fn directory_name_subquery() -> String {
    let digits = format!(
        "replace(replace(replace(replace(replace(p.{num}, ' ', ''), '+', ''), ')', ''), '(', ''), '-', '')",
        num = directory_phone::FULL_NUMBER,
    );
    format!(
        "(SELECT IFNULL(r.{first}, 'N/A') || ' ' || IFNULL(r.{last}, 'N/A')
          FROM {alias}.{phone} p
          JOIN {alias}.{record} r ON p.{owner} = r.{pk}
          WHERE {digits} != ''
            AND {chat}.{ident} LIKE '%' || {digits}
          LIMIT 1)",
        first = directory_record::FIRST_NAME,
        last = directory_record::LAST_NAME,
        alias = DIRECTORY_ALIAS,
        phone = directory_phone::TABLE,
        record = directory_record::TABLE,
        owner = directory_phone::OWNER,
        pk = directory_record::PK,
        chat = chat::TABLE,
        ident = chat::CHAT_IDENTIFIER,
    )
}

/// Escape LIKE wildcards so user input only ever matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_open_missing_database() {
        let result = MessagesDb::open(Path::new("/definitely/not/here/chat.db"));
        assert!(result.is_err());
    }
}
