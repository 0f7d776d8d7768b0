//! Drive a full mailbox through the classifier into a report.

use std::io::Write;

use tracing::{debug, info};

use crate::classify::classify_message;
use crate::error::Result;
use crate::mailbox::{Mailbox, SearchQuery};
use crate::model::bounce::FailureReason;
use crate::model::message::Message;
use crate::report::csv::{ReportSummary, ReportWriter};

/// Fetch every message matching `query`, classify it, and write bounce rows.
///
/// Messages are processed one at a time in mailbox order. `progress_callback`
/// receives `(processed, total)` after each message. Mailbox errors abort
/// the scan; malformed messages never do.
pub fn scan_mailbox<W: Write, D: Write>(
    mailbox: &mut dyn Mailbox,
    query: &SearchQuery,
    report: &mut ReportWriter<W, D>,
    progress_callback: Option<&dyn Fn(usize, usize)>,
) -> Result<ReportSummary> {
    let ids = mailbox.search(query)?;
    let total = ids.len();
    info!(messages = total, "Scanning mailbox");

    for (i, id) in ids.into_iter().enumerate() {
        let raw = mailbox.fetch(id)?;
        let msg = Message::parse(raw);
        match classify_message(&msg) {
            Some(record) => report.write_record(&record)?,
            None => debug!(id, "Skipped non-bounce message"),
        }
        if let Some(cb) = progress_callback {
            cb(i + 1, total);
        }
    }

    let summary = report.summary().clone();
    info!(
        bounces = summary.total,
        unknown = summary.count(FailureReason::Unknown),
        without_address = summary.without_address,
        "Scan complete"
    );
    Ok(summary)
}
