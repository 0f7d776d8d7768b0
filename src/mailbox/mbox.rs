//! Local MBOX file as a mailbox.

use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use super::{Mailbox, MessageId, SearchQuery};
use crate::error::{BounceError, Result};
use crate::model::message::Message;
use crate::parser::header::parse_date;
use crate::parser::mbox::MboxParser;

/// All messages of an MBOX file, held in memory in file order.
pub struct MboxMailbox {
    messages: Vec<Vec<u8>>,
}

impl MboxMailbox {
    /// Read and split an MBOX file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let parser = MboxParser::new(path)?;
        let mut messages = Vec::new();
        parser.parse(&mut |_offset, bytes| {
            messages.push(bytes.to_vec());
            true
        })?;
        info!(
            path = %parser.path().display(),
            bytes = parser.file_size(),
            messages = messages.len(),
            "Opened MBOX"
        );
        Ok(Self { messages })
    }

    /// Build a mailbox from raw messages already in memory.
    pub fn from_messages(messages: Vec<Vec<u8>>) -> Self {
        Self { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn received_on(raw: &[u8]) -> Option<NaiveDate> {
        let msg = Message::parse(raw);
        msg.header("date")
            .and_then(parse_date)
            .map(|dt| dt.date_naive())
    }
}

impl Mailbox for MboxMailbox {
    fn search(&mut self, query: &SearchQuery) -> Result<Vec<MessageId>> {
        let ids = (1..).zip(&self.messages);
        Ok(match query {
            SearchQuery::All => ids.map(|(id, _)| id).collect(),
            SearchQuery::On(date) => ids
                .filter(|(_, raw)| Self::received_on(raw) == Some(*date))
                .map(|(id, _)| id)
                .collect(),
        })
    }

    fn fetch(&mut self, id: MessageId) -> Result<Vec<u8>> {
        id.checked_sub(1)
            .and_then(|idx| self.messages.get(idx as usize))
            .cloned()
            .ok_or(BounceError::UnknownMessage(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailbox() -> MboxMailbox {
        MboxMailbox::from_messages(vec![
            b"From: a@b\nDate: Tue, 16 Aug 2022 10:00:00 +0000\n\none\n".to_vec(),
            b"From: c@d\nDate: Wed, 17 Aug 2022 10:00:00 +0000\n\ntwo\n".to_vec(),
            b"From: e@f\nDate: not a date\n\nthree\n".to_vec(),
        ])
    }

    #[test]
    fn test_search_all() {
        assert_eq!(mailbox().search(&SearchQuery::All).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_search_on_date() {
        let date = NaiveDate::from_ymd_opt(2022, 8, 17).unwrap();
        assert_eq!(mailbox().search(&SearchQuery::On(date)).unwrap(), vec![2]);
    }

    #[test]
    fn test_fetch_bounds() {
        let mut mbox = mailbox();
        assert!(mbox.fetch(1).unwrap().ends_with(b"one\n"));
        assert!(matches!(mbox.fetch(0), Err(BounceError::UnknownMessage(0))));
        assert!(matches!(mbox.fetch(4), Err(BounceError::UnknownMessage(4))));
    }
}
