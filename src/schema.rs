//! Database schema definitions
//!
//! Table and column names of the Messages `chat.db` store and of the
//! AddressBook database attached next to it, for use with rusqlite.

/// Schema alias the contacts database is attached under
pub const DIRECTORY_ALIAS: &str = "adb";

/// Seconds between the Unix epoch and 2001-01-01, the Apple reference date
pub const APPLE_EPOCH_OFFSET_SECS: i64 = 978_307_200;

/// Chats table schema
pub mod chat {
    /// Table name
    pub const TABLE: &str = "chat";
    /// Primary key column
    pub const ROWID: &str = "ROWID";
    /// Phone number, email or group identifier
    pub const CHAT_IDENTIFIER: &str = "chat_identifier";
}

/// Chat to message join table schema
pub mod chat_message_join {
    /// Table name
    pub const TABLE: &str = "chat_message_join";
    /// Foreign key to chat
    pub const CHAT_ID: &str = "chat_id";
    /// Foreign key to message
    pub const MESSAGE_ID: &str = "message_id";
}

/// Messages table schema
pub mod message {
    /// Table name
    pub const TABLE: &str = "message";
    /// Primary key column
    pub const ROWID: &str = "ROWID";
    /// Message text content column
    pub const TEXT: &str = "text";
    /// Flag indicating if message is from current user
    pub const IS_FROM_ME: &str = "is_from_me";
    /// Nanoseconds since 2001-01-01 UTC
    pub const DATE: &str = "date";
}

/// AddressBook phone numbers table schema
pub mod directory_phone {
    /// Table name
    pub const TABLE: &str = "ZABCDPHONENUMBER";
    /// Owning record column
    pub const OWNER: &str = "ZOWNER";
    /// Formatted phone number column
    pub const FULL_NUMBER: &str = "ZFULLNUMBER";
}

/// AddressBook records table schema
pub mod directory_record {
    /// Table name
    pub const TABLE: &str = "ZABCDRECORD";
    /// Primary key column
    pub const PK: &str = "Z_PK";
    /// Given name column
    pub const FIRST_NAME: &str = "ZFIRSTNAME";
    /// Family name column
    pub const LAST_NAME: &str = "ZLASTNAME";
}
