//! A fetched mail item, parsed once and read-only afterwards.

use crate::parser::header::{decode_header, decode_header_bytes, find_header_end, unfold_headers};
use crate::parser::mime;

/// One message as fetched from a mailbox.
///
/// Headers are split and unfolded on construction; the body is only walked
/// when [`Message::body_text`] is called, so messages rejected by the sender
/// filter never pay for MIME decoding.
#[derive(Debug, Clone)]
pub struct Message {
    /// `(lowercase_name, raw_value)` pairs in document order.
    headers: Vec<(String, String)>,
    raw: Vec<u8>,
}

impl Message {
    /// Build a message from raw RFC 5322 bytes (an MBOX `From ` line is tolerated).
    ///
    /// Never fails: a message without a header/body separator is treated as
    /// all headers, garbage lines are skipped.
    pub fn parse(raw: impl Into<Vec<u8>>) -> Self {
        let raw = raw.into();
        let data = mime::skip_from_line(&raw);
        let header_end = find_header_end(data).unwrap_or(data.len());
        let headers = unfold_headers(&decode_header_bytes(&data[..header_end]));
        Self { headers, raw }
    }

    /// First raw value of a header (name is case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First value of a header with RFC 2047 encoded words decoded.
    pub fn decoded_header(&self, name: &str) -> Option<String> {
        self.header(name).map(decode_header)
    }

    /// All header pairs in document order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Plain-text body: every `text/plain` part, decoded and joined by `"\n"`.
    pub fn body_text(&self) -> String {
        mime::extract_text_from_raw(&self.raw)
    }
}
