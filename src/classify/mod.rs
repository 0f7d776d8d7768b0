//! Bounce classification: sender gate, recipient recovery, and reason rules.

pub mod address;
pub mod reason;
pub mod sender;

use tracing::debug;

use crate::model::bounce::{BounceRecord, Diagnostics};
use crate::model::message::Message;

/// Headers copied into the diagnostic block of `Unknown` records, in order.
pub const DIAGNOSTIC_HEADERS: [&str; 4] = ["subject", "to", "from", "date"];

/// Classify one message.
///
/// Returns `None` when the sender filter rejects the message; such messages
/// are neither counted nor reported. Otherwise the body is extracted once and
/// fed to both the address extractor and the reason classifier.
pub fn classify_message(msg: &Message) -> Option<BounceRecord> {
    let from = msg.decoded_header("from").unwrap_or_default();
    if !sender::is_bounce_sender(&from) {
        debug!(from = %from, "Not a bounce sender, skipping");
        return None;
    }

    let body = msg.body_text();
    let address = address::extract_address(&body);
    let reason = reason::classify_reason(&body);
    debug!(from = %from, address = ?address, reason = %reason, "Classified bounce");

    if !reason.is_unknown() {
        return Some(BounceRecord::known(address, reason));
    }

    Some(BounceRecord {
        address,
        reason,
        diagnostics: Some(Diagnostics {
            headers: diagnostic_headers(msg),
            body,
        }),
    })
}

/// Parse raw bytes and classify them.
pub fn classify_raw(raw: &[u8]) -> Option<BounceRecord> {
    classify_message(&Message::parse(raw))
}

/// Build the labeled header block: `"SUBJECT : …\nTO      : …\n…"`.
pub fn diagnostic_headers(msg: &Message) -> String {
    DIAGNOSTIC_HEADERS
        .iter()
        .map(|name| {
            let value = msg.decoded_header(name).unwrap_or_default();
            format!("{:<8}: {}\n", name.to_uppercase(), value)
        })
        .collect()
}
