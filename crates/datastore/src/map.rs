use crate::{slot::Slot, store::KeyValueStore};
use alloc::vec::Vec;
use primitives::{keccak256, pad_key, Address, B256, U256};

/// The storage key of a mapping child: `keccak256(key ‖ base)` with the
/// key normalized like a datastore key (right-padded to a word, or hashed
/// when longer than 32 bytes).
pub(crate) fn child_key(base: B256, key: &[u8]) -> B256 {
    child_word(base, pad_key(key))
}

fn child_word(base: B256, key: B256) -> B256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(key.as_slice());
    buf[32..].copy_from_slice(base.as_slice());
    keccak256(buf)
}

/// Types usable as mapping keys.
///
/// Byte strings follow the datastore key rule (right-padded to a word, or
/// hashed when longer); scalar types encode as the 32-byte word Solidity
/// would hash for the same key, so typed lookups line up with on-chain
/// mappings.
pub trait MappingKey {
    /// The normalized 32-byte key fed into the child derivation.
    fn to_word(&self) -> B256;
}

impl MappingKey for [u8] {
    fn to_word(&self) -> B256 {
        pad_key(self)
    }
}

impl<const N: usize> MappingKey for [u8; N] {
    fn to_word(&self) -> B256 {
        pad_key(self)
    }
}

impl MappingKey for str {
    fn to_word(&self) -> B256 {
        pad_key(self.as_bytes())
    }
}

impl MappingKey for B256 {
    fn to_word(&self) -> B256 {
        *self
    }
}

impl MappingKey for U256 {
    fn to_word(&self) -> B256 {
        B256::from(*self)
    }
}

impl MappingKey for u64 {
    fn to_word(&self) -> B256 {
        B256::from(U256::from(*self))
    }
}

impl MappingKey for bool {
    fn to_word(&self) -> B256 {
        B256::with_last_byte(*self as u8)
    }
}

impl MappingKey for Address {
    fn to_word(&self) -> B256 {
        // Left-padded, the word Solidity hashes for address keys.
        let mut word = B256::ZERO;
        word[12..].copy_from_slice(self.as_slice());
        word
    }
}

impl<K: MappingKey + ?Sized> MappingKey for &K {
    fn to_word(&self) -> B256 {
        (**self).to_word()
    }
}

/// A keyed mapping rooted at a slot.
///
/// Children live at `keccak256(key ‖ base)`, the Solidity mapping rule, so
/// word-sized keys line up with on-chain mappings at the same root.
#[derive(Debug)]
pub struct Mapping<'a, S> {
    kv: &'a mut S,
    key: B256,
}

impl<'a, S: KeyValueStore> Mapping<'a, S> {
    pub(crate) fn new(kv: &'a mut S, key: B256) -> Self {
        Self { kv, key }
    }

    /// Storage key of the mapping root.
    pub fn key(&self) -> B256 {
        self.key
    }

    /// The value slot of `key`.
    pub fn get<K: MappingKey + ?Sized>(self, key: &K) -> Slot<'a, S> {
        let child = child_word(self.key, key.to_word());
        Slot::new(self.kv, child)
    }

    /// The nested mapping rooted at the value slot of `key`.
    pub fn nested<K: MappingKey + ?Sized>(self, key: &K) -> Mapping<'a, S> {
        let child = child_word(self.key, key.to_word());
        Mapping::new(self.kv, child)
    }

    /// The value slot at the end of a chain of nested mapping keys.
    ///
    /// `get_nested(&[a, b, c])` is `nested(a).nested(b).get(c)`.
    pub fn get_nested(self, keys: &[&[u8]]) -> Slot<'a, S> {
        let mut current = self.key;
        for key in keys {
            current = child_key(current, key);
        }
        Slot::new(self.kv, current)
    }

    /// Collects the derivation path of `keys` without touching storage.
    pub fn nested_keys(&self, keys: &[&[u8]]) -> Vec<B256> {
        let mut out = Vec::with_capacity(keys.len());
        let mut current = self.key;
        for key in keys {
            current = child_key(current, key);
            out.push(current);
        }
        out
    }
}
