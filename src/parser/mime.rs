//! MIME body extraction: depth-first walk collecting every `text/plain` part.

use mail_parser::{MessageParser, MimeHeaders, PartType};

use crate::parser::header::decode_charset;

/// Maximum nesting of embedded `message/rfc822` parts we descend into.
const MAX_DEPTH: usize = 10;

/// Parse a raw message and return its plain-text body.
///
/// See [`extract_text`]. Input `mail-parser` cannot parse yields `""`.
pub fn extract_text_from_raw(raw_message: &[u8]) -> String {
    match MessageParser::default().parse(skip_from_line(raw_message)) {
        Some(msg) => extract_text(&msg),
        None => String::new(),
    }
}

/// Concatenate the decoded content of every `text/plain` part, in document order.
///
/// Multipart containers and attached `message/rfc822` messages (the original
/// message a bounce quotes) are descended into. Parts without a
/// `Content-Type` count as `text/plain`. Empty parts are skipped, the rest are
/// joined with `"\n"`. A message with no text/plain part yields `""`.
pub fn extract_text(msg: &mail_parser::Message<'_>) -> String {
    let mut texts = Vec::new();
    collect_text_parts(msg, 0, 0, &mut texts);
    texts.join("\n")
}

fn collect_text_parts(
    msg: &mail_parser::Message<'_>,
    part_id: usize,
    depth: usize,
    out: &mut Vec<String>,
) {
    let Some(part) = msg.parts.get(part_id) else {
        return;
    };

    match &part.body {
        PartType::Multipart(children) => {
            for child in children {
                collect_text_parts(msg, *child as usize, depth, out);
            }
        }
        PartType::Message(nested) => {
            if depth < MAX_DEPTH {
                collect_text_parts(nested, 0, depth + 1, out);
            }
        }
        PartType::Text(text) if is_text_plain(part) => {
            if !text.is_empty() {
                out.push(text.to_string());
            }
        }
        PartType::Binary(bytes) | PartType::InlineBinary(bytes) if is_text_plain(part) => {
            let charset = part.content_type().and_then(|ct| ct.attribute("charset"));
            let text = decode_charset(charset, bytes);
            if !text.is_empty() {
                out.push(text);
            }
        }
        _ => {}
    }
}

/// Whether a part's content type is exactly `text/plain` (the default when absent).
fn is_text_plain(part: &mail_parser::MessagePart<'_>) -> bool {
    match part.content_type() {
        Some(ct) => {
            ct.ctype().eq_ignore_ascii_case("text")
                && ct
                    .subtype()
                    .map(|sub| sub.eq_ignore_ascii_case("plain"))
                    .unwrap_or(false)
        }
        None => true,
    }
}

/// Skip the `From ` separator line at the start of MBOX messages.
pub fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}
