//! Remote mailbox over IMAP with implicit TLS.

use std::net::TcpStream;

use native_tls::{TlsConnector, TlsStream};
use tracing::{debug, info, warn};

use super::{Mailbox, MessageId, SearchQuery};
use crate::config::MailboxConfig;
use crate::error::{BounceError, Result};

/// An authenticated IMAP session with one folder examined (read-only).
pub struct ImapMailbox {
    session: ::imap::Session<TlsStream<TcpStream>>,
    folder: String,
}

impl ImapMailbox {
    /// Connect, log in, and `EXAMINE` the configured folder.
    pub fn connect(config: &MailboxConfig) -> Result<Self> {
        if config.user.is_empty() || config.password.is_empty() {
            return Err(BounceError::MissingCredentials);
        }

        let tls = TlsConnector::builder()
            .build()
            .map_err(|e| BounceError::Tls(e.to_string()))?;

        info!(host = %config.host, port = config.port, "Connecting to IMAP server");
        let addr = (config.host.as_str(), config.port);
        let client = ::imap::connect(addr, config.host.as_str(), &tls)?;

        let mut session = client
            .login(&config.user, &config.password)
            .map_err(|(e, _client)| BounceError::Imap(format!("login failed: {e}")))?;

        let mailbox = session.examine(&config.folder)?;
        info!(
            folder = %config.folder,
            exists = mailbox.exists,
            "Opened folder read-only"
        );

        Ok(Self {
            session,
            folder: config.folder.clone(),
        })
    }
}

impl Mailbox for ImapMailbox {
    fn search(&mut self, query: &SearchQuery) -> Result<Vec<MessageId>> {
        let criterion = query.to_imap();
        let mut ids: Vec<MessageId> = self.session.search(&criterion)?.into_iter().collect();
        ids.sort_unstable();
        debug!(folder = %self.folder, criterion = %criterion, hits = ids.len(), "IMAP search");
        Ok(ids)
    }

    fn fetch(&mut self, id: MessageId) -> Result<Vec<u8>> {
        let fetches = self.session.fetch(id.to_string(), "RFC822")?;
        fetches
            .iter()
            .find_map(|f| f.body())
            .map(<[u8]>::to_vec)
            .ok_or(BounceError::UnknownMessage(id))
    }
}

impl Drop for ImapMailbox {
    fn drop(&mut self) {
        if let Err(e) = self.session.logout() {
            warn!(error = %e, "IMAP logout failed");
        }
    }
}
