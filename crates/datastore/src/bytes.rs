//! Variable-length byte values in the two-form Solidity representation.
//!
//! Values of at most 31 bytes pack into the anchor slot, left-justified,
//! with the low byte holding `2 * len` (even). Longer values store
//! `2 * len + 1` (odd) in the anchor and the data in consecutive slots at
//! `keccak256(anchor) + i`. The low-bit parity of the anchor selects the
//! form on read.

use crate::store::KeyValueStore;
use alloc::vec::Vec;
use primitives::{keccak256, B256, U256};

pub(crate) fn write_bytes<S: KeyValueStore>(kv: &mut S, anchor: B256, value: &[u8]) {
    if value.len() <= 31 {
        let mut word = B256::ZERO;
        word[..value.len()].copy_from_slice(value);
        word[31] = (value.len() as u8) * 2;
        kv.set(anchor, word);
        return;
    }

    let marker = U256::from(value.len() as u64) * U256::from(2u8) + U256::from(1u8);
    kv.set(anchor, B256::from(marker));

    let base = U256::from_be_bytes(keccak256(anchor).0);
    for (i, chunk) in value.chunks(32).enumerate() {
        let mut word = B256::ZERO;
        word[..chunk.len()].copy_from_slice(chunk);
        kv.set(B256::from(base + U256::from(i as u64)), word);
    }
}

pub(crate) fn read_bytes<S: KeyValueStore>(kv: &mut S, anchor: B256) -> Vec<u8> {
    let word = kv.get(anchor);
    let low = word[31];
    if low & 1 == 0 {
        // Short form; the low byte is twice the length.
        let len = (low / 2) as usize;
        return word[..len.min(31)].to_vec();
    }

    let len = ((U256::from_be_bytes(word.0) - U256::from(1u8)) / U256::from(2u8))
        .try_into()
        .unwrap_or(usize::MAX);
    let mut out = Vec::with_capacity(len);
    let base = U256::from_be_bytes(keccak256(anchor).0);
    let mut i = 0u64;
    while out.len() < len {
        let word = kv.get(B256::from(base + U256::from(i)));
        let take = (len - out.len()).min(32);
        out.extend_from_slice(&word[..take]);
        i += 1;
    }
    out
}
