//! `bouncescan`: classify delivery-failure notifications found in a mailbox.
//!
//! The library decodes each fetched message, keeps only those sent by a
//! delivery agent, recovers the recipient that bounced, and maps the bounce
//! text to a [`model::bounce::FailureReason`]. Mailboxes can be a remote
//! IMAP folder or a local MBOX file.

pub mod classify;
pub mod config;
pub mod error;
pub mod mailbox;
pub mod model;
pub mod parser;
pub mod report;
pub mod scan;
