use crate::{
    map,
    slot::{offset_key, Slot},
    store::KeyValueStore,
    StoreError,
};
use alloc::vec::Vec;
use primitives::{index_key, B256, U256};

fn read_len<S: KeyValueStore>(kv: &mut S, key: B256) -> u64 {
    let word = kv.get(key);
    let mut out = [0u8; 8];
    out.copy_from_slice(&word[24..]);
    u64::from_be_bytes(out)
}

fn write_len<S: KeyValueStore>(kv: &mut S, key: B256, len: u64) {
    kv.set(key, B256::from(U256::from(len)));
}

/// A growable array rooted at a slot.
///
/// The length lives in the root slot; element `i` lives in the mapping
/// slot of the 32-byte big-endian index. This is deliberately not
/// Solidity's contiguous dynamic-array region: on-chain readers must
/// derive element slots with the keyed scheme.
#[derive(Debug)]
pub struct DynamicArray<'a, S> {
    kv: &'a mut S,
    key: B256,
}

impl<'a, S: KeyValueStore> DynamicArray<'a, S> {
    pub(crate) fn new(kv: &'a mut S, key: B256) -> Self {
        Self { kv, key }
    }

    /// Storage key of the array root.
    pub fn key(&self) -> B256 {
        self.key
    }

    /// Number of elements.
    pub fn len(&mut self) -> u64 {
        read_len(self.kv, self.key)
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Storage key of element `i`, independent of the current length.
    pub fn element_key(&self, index: u64) -> B256 {
        map::child_key(self.key, index_key(index).as_slice())
    }

    /// The slot of element `index`, `None` when out of range.
    pub fn get(self, index: u64) -> Option<Slot<'a, S>> {
        if index >= read_len(self.kv, self.key) {
            return None;
        }
        let key = self.element_key(index);
        Some(Slot::new(self.kv, key))
    }

    /// Grows the array by one element and returns the new tail slot.
    pub fn push(self) -> Slot<'a, S> {
        let len = read_len(self.kv, self.key);
        write_len(self.kv, self.key, len + 1);
        let key = self.element_key(len);
        Slot::new(self.kv, key)
    }

    /// Shrinks the array by one element and returns the popped slot,
    /// `None` when the array is already empty.
    pub fn pop(self) -> Option<Slot<'a, S>> {
        let len = read_len(self.kv, self.key);
        if len == 0 {
            return None;
        }
        write_len(self.kv, self.key, len - 1);
        let key = self.element_key(len - 1);
        Some(Slot::new(self.kv, key))
    }

    /// The slot at the end of a chain of nested dynamic-array indices,
    /// treating each element along the way as a nested array root.
    pub fn get_nested(self, indices: &[u64]) -> Option<Slot<'a, S>> {
        let mut key = self.key;
        for &index in indices {
            if index >= read_len(self.kv, key) {
                return None;
            }
            key = map::child_key(key, index_key(index).as_slice());
        }
        Some(Slot::new(self.kv, key))
    }
}

/// A fixed multi-dimensional array of consecutive slots.
///
/// Element `[i₀, …, i_{k-1}]` lives at `base + Σ iⱼ · Π_{m>j} d_m`; no
/// hashing is involved. Out-of-range access yields a null handle: reads
/// are zero, writes are ignored.
#[derive(Debug)]
pub struct SlotArray<'a, S> {
    kv: &'a mut S,
    key: B256,
    dims: Vec<u64>,
}

impl<'a, S: KeyValueStore> SlotArray<'a, S> {
    pub(crate) fn new(kv: &'a mut S, key: B256, dims: &[u64]) -> Self {
        Self {
            kv,
            key,
            dims: dims.to_vec(),
        }
    }

    /// Storage key of the array base.
    pub fn key(&self) -> B256 {
        self.key
    }

    /// Extent of the first dimension.
    pub fn len(&self) -> u64 {
        self.dims.first().copied().unwrap_or(0)
    }

    /// Whether the first dimension is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension extents.
    pub fn dims(&self) -> &[u64] {
        &self.dims
    }

    /// Linear slot offset of a full index vector.
    fn offset(&self, indices: &[u64]) -> Option<u64> {
        linear_offset(&self.dims, indices)
    }

    /// The slot of a fully-indexed element, `None` when out of range.
    pub fn get(self, indices: &[u64]) -> Option<Slot<'a, S>> {
        let offset = self.offset(indices)?;
        Some(Slot::new(self.kv, offset_key(self.key, offset)))
    }

    /// The sub-array selected by a prefix of indices, `None` when the
    /// prefix is out of range or not a strict prefix.
    pub fn sub_array(self, prefix: &[u64]) -> Option<SlotArray<'a, S>> {
        if prefix.len() >= self.dims.len() {
            return None;
        }
        let mut offset: u64 = 0;
        for (axis, &index) in prefix.iter().enumerate() {
            if index >= self.dims[axis] {
                return None;
            }
            offset = offset.checked_add(index.checked_mul(stride(&self.dims, axis)?)?)?;
        }
        let dims = self.dims[prefix.len()..].to_vec();
        Some(SlotArray {
            kv: self.kv,
            key: offset_key(self.key, offset),
            dims,
        })
    }

    /// Reads a fully-indexed element, zero when out of range.
    pub fn read(&mut self, indices: &[u64]) -> B256 {
        match self.offset(indices) {
            Some(offset) => {
                let key = offset_key(self.key, offset);
                self.kv.get(key)
            }
            None => B256::ZERO,
        }
    }

    /// Writes a fully-indexed element; ignored when out of range.
    pub fn write(&mut self, indices: &[u64], value: B256) {
        if let Some(offset) = self.offset(indices) {
            let key = offset_key(self.key, offset);
            self.kv.set(key, value);
        }
    }
}

fn stride(dims: &[u64], axis: usize) -> Option<u64> {
    let mut out: u64 = 1;
    for &d in &dims[axis + 1..] {
        out = out.checked_mul(d)?;
    }
    Some(out)
}

fn linear_offset(dims: &[u64], indices: &[u64]) -> Option<u64> {
    if indices.len() != dims.len() {
        return None;
    }
    let mut offset: u64 = 0;
    for (axis, (&index, &dim)) in indices.iter().zip(dims.iter()).enumerate() {
        if index >= dim {
            return None;
        }
        offset = offset.checked_add(index.checked_mul(stride(dims, axis)?)?)?;
    }
    Some(offset)
}

/// A multi-dimensional array of fixed-width byte items packed into slots.
///
/// Items narrower than a word pack `⌊32 / W⌋` to a slot along the last
/// dimension; wider items span `⌈W / 32⌉` consecutive slots each.
#[derive(Debug)]
pub struct BytesArray<'a, S> {
    kv: &'a mut S,
    key: B256,
    dims: Vec<u64>,
    item_size: usize,
}

impl<'a, S: KeyValueStore> BytesArray<'a, S> {
    pub(crate) fn new(kv: &'a mut S, key: B256, dims: &[u64], item_size: usize) -> Self {
        Self {
            kv,
            key,
            dims: dims.to_vec(),
            item_size,
        }
    }

    /// Item width in bytes.
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Items per slot along the last dimension (1 for wide items).
    fn items_per_slot(&self) -> u64 {
        if self.item_size < 32 {
            (32 / self.item_size) as u64
        } else {
            1
        }
    }

    /// Slots per item (1 for narrow items).
    fn slots_per_item(&self) -> u64 {
        (self.item_size as u64).div_ceil(32)
    }

    /// Dimension extents measured in slots rather than items.
    fn slot_dims(&self) -> Option<Vec<u64>> {
        let (&last, head) = self.dims.split_last()?;
        let mut dims = head.to_vec();
        let scaled = if self.item_size < 32 {
            last.div_ceil(self.items_per_slot())
        } else {
            last.checked_mul(self.slots_per_item())?
        };
        dims.push(scaled);
        Some(dims)
    }

    /// Slot offset and intra-slot byte offset of a fully-indexed item.
    fn locate(&self, indices: &[u64]) -> Option<(u64, usize)> {
        if indices.len() != self.dims.len() || self.item_size == 0 {
            return None;
        }
        for (&index, &dim) in indices.iter().zip(self.dims.iter()) {
            if index >= dim {
                return None;
            }
        }
        let slot_dims = self.slot_dims()?;
        let mut slot_indices = indices.to_vec();
        let last = *slot_indices.last()?;
        let byte_offset;
        if self.item_size < 32 {
            let per_slot = self.items_per_slot();
            *slot_indices.last_mut()? = last / per_slot;
            byte_offset = (last % per_slot) as usize * self.item_size;
        } else {
            *slot_indices.last_mut()? = last.checked_mul(self.slots_per_item())?;
            byte_offset = 0;
        }
        // The scaled last index is already in range by construction, so
        // compute the offset against the slot grid directly.
        let mut offset: u64 = 0;
        for (axis, &index) in slot_indices.iter().enumerate() {
            offset = offset.checked_add(index.checked_mul(stride(&slot_dims, axis)?)?)?;
        }
        Some((offset, byte_offset))
    }

    /// Reads a fully-indexed item, empty when out of range.
    pub fn get(&mut self, indices: &[u64]) -> Vec<u8> {
        let Some((slot_offset, byte_offset)) = self.locate(indices) else {
            return Vec::new();
        };
        let width = self.item_size;
        if width <= 32 {
            let word = self.kv.get(offset_key(self.key, slot_offset));
            return word[byte_offset..byte_offset + width].to_vec();
        }
        let mut out = Vec::with_capacity(width);
        let mut slot = slot_offset;
        while out.len() < width {
            let word = self.kv.get(offset_key(self.key, slot));
            let take = (width - out.len()).min(32);
            out.extend_from_slice(&word[..take]);
            slot += 1;
        }
        out
    }

    /// Writes a fully-indexed item.
    ///
    /// The payload must be exactly the item width; out-of-range indices
    /// are ignored.
    pub fn set(&mut self, indices: &[u64], value: &[u8]) -> Result<(), StoreError> {
        if value.len() != self.item_size {
            return Err(StoreError::InvalidFieldSize {
                expected: self.item_size,
                got: value.len(),
            });
        }
        let Some((slot_offset, byte_offset)) = self.locate(indices) else {
            return Ok(());
        };
        if self.item_size <= 32 {
            let key = offset_key(self.key, slot_offset);
            let mut word = self.kv.get(key);
            word[byte_offset..byte_offset + self.item_size].copy_from_slice(value);
            self.kv.set(key, word);
            return Ok(());
        }
        for (i, chunk) in value.chunks(32).enumerate() {
            let mut word = B256::ZERO;
            word[..chunk.len()].copy_from_slice(chunk);
            self.kv.set(offset_key(self.key, slot_offset + i as u64), word);
        }
        Ok(())
    }
}
