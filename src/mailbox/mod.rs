//! Mailbox access: the source of raw messages to classify.
//!
//! A [`Mailbox`] can list message ids matching a [`SearchQuery`] and fetch
//! the raw RFC 822 bytes of one message. Two backends exist: a remote IMAP
//! folder opened read-only, and a local MBOX file.

pub mod imap;
pub mod mbox;

use chrono::NaiveDate;

use crate::error::{BounceError, Result};

/// Identifier of a message inside one mailbox session (1-based sequence number).
pub type MessageId = u32;

/// IMAP-style search date format, e.g. `16-Aug-2022`.
pub const SEARCH_DATE_FORMAT: &str = "%d-%b-%Y";

/// Which messages to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchQuery {
    All,
    /// Messages received on this calendar date.
    On(NaiveDate),
}

impl SearchQuery {
    /// The query as an IMAP `SEARCH` criterion.
    pub fn to_imap(&self) -> String {
        match self {
            Self::All => "ALL".to_string(),
            Self::On(date) => format!("ON \"{}\"", format_search_date(*date)),
        }
    }
}

/// Read access to a mailbox.
pub trait Mailbox {
    /// Ids of the messages matching `query`, ascending (mailbox order).
    fn search(&mut self, query: &SearchQuery) -> Result<Vec<MessageId>>;

    /// Full raw content of one message.
    fn fetch(&mut self, id: MessageId) -> Result<Vec<u8>>;
}

/// Format a date the way IMAP `SEARCH ON` expects: `16-Aug-2022`.
pub fn format_search_date(date: NaiveDate) -> String {
    date.format(SEARCH_DATE_FORMAT).to_string()
}

/// Parse a user-supplied date: `2022-08-16` or `16-Aug-2022`.
pub fn parse_date_arg(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, SEARCH_DATE_FORMAT))
        .map_err(|_| BounceError::InvalidDate(input.to_string()))
}
