//! Reader for individual `.eml` files (RFC 5322 messages without MBOX framing).

use std::path::Path;

use crate::error::{BounceError, Result};
use crate::model::message::Message;

/// Read a single `.eml` file into a [`Message`].
pub fn read_eml(path: impl AsRef<Path>) -> Result<Message> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BounceError::FileNotFound(path.to_path_buf())
        } else {
            BounceError::io(path, e)
        }
    })?;
    Ok(Message::parse(data))
}
