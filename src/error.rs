//! Centralized error types for bouncescan.
//!
//! Only the mailbox side can fail. Header and body decoding degrade to
//! best-effort text and never produce an error.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the bouncescan library.
#[derive(Error, Debug)]
pub enum BounceError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The given file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The IMAP server rejected a command or the connection dropped.
    #[error("IMAP error: {0}")]
    Imap(String),

    /// The TLS connector could not be built.
    #[error("TLS error: {0}")]
    Tls(String),

    /// No user or password is configured for the remote mailbox.
    #[error("Mailbox credentials missing: set mailbox.user and mailbox.password (or $BOUNCESCAN_PASSWORD)")]
    MissingCredentials,

    /// A date argument could not be parsed.
    #[error("Invalid date '{0}': expected YYYY-MM-DD or D-Mon-YYYY")]
    InvalidDate(String),

    /// `since` lies after `until`.
    #[error("Empty date range: {since} is after {until}")]
    EmptyDateRange { since: String, until: String },

    /// The mailbox has no message with this identifier.
    #[error("No message with id {0} in mailbox")]
    UnknownMessage(u32),

    /// The configuration file exists but could not be used.
    #[error("Invalid configuration in '{path}': {reason}")]
    Config { path: PathBuf, reason: String },
}

/// Convenience alias for `Result<T, BounceError>`.
pub type Result<T> = std::result::Result<T, BounceError>;

impl BounceError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Allow `?` on `std::io::Error` when no path context is available
/// (report writers; prefer `BounceError::io` for files).
impl From<std::io::Error> for BounceError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<stream>"),
            source,
        }
    }
}

impl From<imap::Error> for BounceError {
    fn from(err: imap::Error) -> Self {
        Self::Imap(err.to_string())
    }
}
