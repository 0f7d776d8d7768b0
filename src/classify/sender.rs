//! Sender filter: is this message from an automated delivery agent?

/// Markers that identify a delivery agent in the `From` header.
///
/// Loose on purpose: a false positive only costs one `Unknown` row.
pub const BOUNCE_SENDER_MARKERS: &[&str] = &["postmaster", "DAEMON"];

/// Whether the decoded `From` text names a bounce sender.
///
/// Markers match anywhere in the text, ignoring ASCII case, so both
/// `MAILER-DAEMON@host` and `mailer-daemon@googlemail.com` qualify.
pub fn is_bounce_sender(from: &str) -> bool {
    let from = from.to_ascii_lowercase();
    BOUNCE_SENDER_MARKERS
        .iter()
        .any(|marker| from.contains(&marker.to_ascii_lowercase()))
}
