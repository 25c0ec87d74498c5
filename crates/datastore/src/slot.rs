use crate::{
    array::{BytesArray, DynamicArray, SlotArray},
    bytes,
    map::Mapping,
    record::{Record, RecordLayout},
    store::{EphemeralStore, KeyValueStore, PersistentStore},
};
use alloc::vec::Vec;
use env::Environment;
use primitives::{pad_key, Address, B256, I256, U256};

/// Entry point of the structured overlay: hands out [`Slot`]s addressed by
/// caller-supplied byte keys.
///
/// Keys of at most 32 bytes address the slot of the key right-padded to a
/// word; longer keys are keccak-hashed first.
#[derive(Debug)]
pub struct Datastore<S> {
    kv: S,
}

impl<S: KeyValueStore> Datastore<S> {
    /// Wraps a flat store.
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// The slot addressed by `key`.
    pub fn get(&mut self, key: &[u8]) -> Slot<'_, S> {
        Slot::new(&mut self.kv, pad_key(key))
    }
}

impl<'a, 'e> Datastore<PersistentStore<'a, 'e>> {
    /// A datastore over the environment's persistent storage.
    pub fn persistent(env: &'a mut Environment<'e>) -> Self {
        Self::new(PersistentStore::new(env))
    }
}

impl<'a, 'e> Datastore<EphemeralStore<'a, 'e>> {
    /// A datastore over the environment's ephemeral storage.
    pub fn ephemeral(env: &'a mut Environment<'e>) -> Self {
        Self::new(EphemeralStore::new(env))
    }
}

/// One 32-byte cell, plus the typed views and structure derivations
/// anchored at it.
///
/// A slot is a view over `(store, key)`; location is a pure function of
/// the derivation path, so slots carry no identity and re-deriving the
/// same path always yields the same cell. Derivations consume the view and
/// pass the store borrow down to the child handle.
#[derive(Debug)]
pub struct Slot<'a, S> {
    kv: &'a mut S,
    key: B256,
}

impl<'a, S: KeyValueStore> Slot<'a, S> {
    pub(crate) fn new(kv: &'a mut S, key: B256) -> Self {
        Self { kv, key }
    }

    /// Storage key of this slot.
    pub fn key(&self) -> B256 {
        self.key
    }

    /// Raw 32-byte read.
    pub fn read(&mut self) -> B256 {
        self.kv.get(self.key)
    }

    /// Raw 32-byte write.
    pub fn write(&mut self, value: B256) {
        self.kv.set(self.key, value);
    }

    /// Reads the low bit of the slot as a boolean.
    pub fn get_bool(&mut self) -> bool {
        self.read()[31] & 1 == 1
    }

    /// Writes a boolean into the low byte.
    pub fn set_bool(&mut self, value: bool) {
        self.write(B256::with_last_byte(value as u8));
    }

    /// Reads the low 20 bytes as an address.
    pub fn get_address(&mut self) -> Address {
        Address::from_slice(&self.read()[12..])
    }

    /// Writes an address into the low 20 bytes.
    pub fn set_address(&mut self, value: Address) {
        let mut word = B256::ZERO;
        word[12..].copy_from_slice(value.as_slice());
        self.write(word);
    }

    /// Reads the low 8 bytes as an unsigned integer.
    pub fn get_u64(&mut self) -> u64 {
        let word = self.read();
        let mut out = [0u8; 8];
        out.copy_from_slice(&word[24..]);
        u64::from_be_bytes(out)
    }

    /// Writes an unsigned integer into the low 8 bytes.
    pub fn set_u64(&mut self, value: u64) {
        self.set_u256(U256::from(value));
    }

    /// Reads the low 8 bytes as a signed integer.
    ///
    /// Values written through [`Slot::set_i64`] are sign-extended over the
    /// full word, so the low 8 bytes carry the complete two's-complement
    /// encoding.
    pub fn get_i64(&mut self) -> i64 {
        let word = self.read();
        let mut out = [0u8; 8];
        out.copy_from_slice(&word[24..]);
        i64::from_be_bytes(out)
    }

    /// Writes a signed integer, sign-extended over the full word.
    pub fn set_i64(&mut self, value: i64) {
        self.set_i256(I256::try_from(value).unwrap_or_default());
    }

    /// Reads the full word as an unsigned 256-bit integer.
    pub fn get_u256(&mut self) -> U256 {
        U256::from_be_bytes(self.read().0)
    }

    /// Writes an unsigned 256-bit integer.
    pub fn set_u256(&mut self, value: U256) {
        self.write(B256::from(value));
    }

    /// Reads the full word as a signed 256-bit integer.
    pub fn get_i256(&mut self) -> I256 {
        I256::from_raw(self.get_u256())
    }

    /// Writes a signed 256-bit integer in two's complement.
    pub fn set_i256(&mut self, value: I256) {
        self.set_u256(value.into_raw());
    }

    /// Reads a variable-length byte value anchored at this slot.
    pub fn get_bytes(&mut self) -> Vec<u8> {
        bytes::read_bytes(self.kv, self.key)
    }

    /// Writes a variable-length byte value anchored at this slot.
    pub fn set_bytes(&mut self, value: &[u8]) {
        bytes::write_bytes(self.kv, self.key, value);
    }

    /// Views this slot as the root of a keyed mapping.
    pub fn mapping(self) -> Mapping<'a, S> {
        Mapping::new(self.kv, self.key)
    }

    /// Views this slot as the root of a dynamic array.
    pub fn dyn_array(self) -> DynamicArray<'a, S> {
        DynamicArray::new(self.kv, self.key)
    }

    /// Views this slot as the base of a fixed multi-dimensional array.
    pub fn slot_array(self, dims: &[u64]) -> SlotArray<'a, S> {
        SlotArray::new(self.kv, self.key, dims)
    }

    /// Views this slot as the base of a packed byte array with elements of
    /// `item_size` bytes.
    pub fn bytes_array(self, dims: &[u64], item_size: usize) -> BytesArray<'a, S> {
        BytesArray::new(self.kv, self.key, dims, item_size)
    }

    /// Views this slot as the base of a packed record.
    pub fn record<'l>(self, layout: &'l RecordLayout) -> Record<'a, 'l, S> {
        Record::new(self.kv, self.key, layout)
    }
}

/// Fallible variants for code generic over a possibly-absent slot;
/// a `None` handle reads zero and swallows writes.
pub trait SlotExt {
    /// Raw read, zero for an absent handle.
    fn read_or_zero(&mut self) -> B256;

    /// Raw write, ignored for an absent handle.
    fn write_or_ignore(&mut self, value: B256);
}

impl<S: KeyValueStore> SlotExt for Option<Slot<'_, S>> {
    fn read_or_zero(&mut self) -> B256 {
        match self {
            Some(slot) => slot.read(),
            None => B256::ZERO,
        }
    }

    fn write_or_ignore(&mut self, value: B256) {
        if let Some(slot) = self {
            slot.write(value);
        }
    }
}

pub(crate) fn offset_key(base: B256, offset: u64) -> B256 {
    B256::from(U256::from_be_bytes(base.0).wrapping_add(U256::from(offset)))
}
