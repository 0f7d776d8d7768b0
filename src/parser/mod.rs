//! Email parsing: MBOX streaming splitter, EML reader, header decoding, and MIME body extraction.

pub mod eml;
pub mod header;
pub mod mbox;
pub mod mime;
