//! Error envelope carried next to call outputs.
//!
//! Call-family opcodes return two byte strings: the callee output and an
//! envelope describing the callee's error state. A leading `0x00` (or an
//! empty envelope) means success; `0x01` is followed by the UTF-8 error
//! message.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use primitives::Bytes;

const ENVELOPE_OK: u8 = 0x00;
const ENVELOPE_ERR: u8 = 0x01;

/// Encodes an optional error message into its wire envelope.
pub fn encode_error_envelope(error: Option<&str>) -> Bytes {
    match error {
        None => Bytes::copy_from_slice(&[ENVELOPE_OK]),
        Some(msg) => {
            let mut buf = Vec::with_capacity(1 + msg.len());
            buf.push(ENVELOPE_ERR);
            buf.extend_from_slice(msg.as_bytes());
            buf.into()
        }
    }
}

/// Decodes a wire envelope back into an optional error message.
///
/// An empty envelope decodes as success. Malformed UTF-8 decodes into a
/// lossy message rather than failing; the envelope is diagnostic.
pub fn decode_error_envelope(envelope: &[u8]) -> Option<String> {
    match envelope.split_first() {
        None | Some((&ENVELOPE_OK, _)) => None,
        Some((_, msg)) => Some(String::from_utf8_lossy(msg).to_string()),
    }
}
