use core::fmt;
use primitives::B256;

/// Errors surfaced by the structured stores.
///
/// Plain datastore traversal never fails; these arise from packed-record
/// misuse and from preimage lookups of unknown content hashes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// Field or element index is out of range.
    Index {
        /// The index that was requested.
        index: usize,
        /// Number of addressable entries.
        len: usize,
    },
    /// Payload width does not match the declared field size.
    InvalidFieldSize {
        /// Declared size of the field in bytes.
        expected: usize,
        /// Length of the payload that was supplied.
        got: usize,
    },
    /// A record layout declared a field outside 1..=32 bytes.
    InvalidLayout {
        /// The offending field size.
        size: usize,
    },
    /// No preimage is registered under the given content hash.
    PreimageNotFound(B256),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index { index, len } => {
                write!(f, "index {index} out of range for {len} entries")
            }
            Self::InvalidFieldSize { expected, got } => {
                write!(f, "invalid field size: expected {expected} bytes, got {got}")
            }
            Self::InvalidLayout { size } => {
                write!(f, "invalid field size {size} in record layout")
            }
            Self::PreimageNotFound(hash) => write!(f, "preimage not found: {hash}"),
        }
    }
}

impl core::error::Error for StoreError {}
