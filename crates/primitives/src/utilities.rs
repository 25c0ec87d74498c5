use alloy_primitives::{keccak256, Address, B256, U256};

/// Converts a `u64` into the address formed by its big-endian bytes in the
/// low 8 bytes of the 20-byte address.
pub const fn u64_to_address(x: u64) -> Address {
    let x = x.to_be_bytes();
    Address::new([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7],
    ])
}

/// Encodes an array index as a 32-byte big-endian word.
pub fn index_key(index: u64) -> B256 {
    B256::from(U256::from(index))
}

/// Normalizes an arbitrary-length key into a 32-byte storage key.
///
/// Keys of at most 32 bytes are right-padded with zeros; longer keys are
/// replaced by their keccak-256 hash.
pub fn pad_key(key: &[u8]) -> B256 {
    if key.len() > 32 {
        return keccak256(key);
    }
    let mut padded = B256::ZERO;
    padded[..key.len()].copy_from_slice(key);
    padded
}
