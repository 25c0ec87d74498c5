//! Constants shared across the Keystone crates.

use alloy_primitives::{b256, B256};

/// Keccak-256 hash of the empty byte string.
pub const KECCAK_EMPTY: B256 =
    b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");

/// Content address of the empty preimage.
///
/// Always reported as present by preimage registries and never written to
/// the underlying store.
pub const EMPTY_PREIMAGE_HASH: B256 = KECCAK_EMPTY;

/// Addresses strictly below this value are reserved for the enclosing
/// engine's own precompiles and cannot be claimed through the registry.
pub const RESERVED_ADDRESS_SPACE: u64 = 0x80;
