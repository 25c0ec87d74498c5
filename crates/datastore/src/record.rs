//! Packed records: heterogeneous fixed-width fields laid out over
//! consecutive slots.
//!
//! Fields pack back to back; a field that would straddle a 32-byte
//! boundary starts at the next slot instead. The record occupies
//! `⌈final_offset / 32⌉` slots.

use crate::{
    slot::{offset_key, Slot},
    store::KeyValueStore,
    StoreError,
};
use alloc::vec::Vec;
use primitives::B256;

/// Precomputed layout of a packed record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordLayout {
    sizes: Vec<usize>,
    offsets: Vec<usize>,
    slot_count: usize,
}

impl RecordLayout {
    /// Computes the layout for fields of the given byte sizes, in order.
    ///
    /// Every size must be in `1..=32`.
    pub fn new(sizes: &[usize]) -> Result<Self, StoreError> {
        let mut offsets = Vec::with_capacity(sizes.len());
        let mut offset = 0usize;
        for &size in sizes {
            if size == 0 || size > 32 {
                return Err(StoreError::InvalidLayout { size });
            }
            if offset % 32 + size > 32 {
                offset = (offset / 32 + 1) * 32;
            }
            offsets.push(offset);
            offset += size;
        }
        Ok(Self {
            sizes: sizes.to_vec(),
            offsets,
            slot_count: offset.div_ceil(32),
        })
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.sizes.len()
    }

    /// Byte size of field `index`.
    pub fn field_size(&self, index: usize) -> Result<usize, StoreError> {
        self.sizes.get(index).copied().ok_or(StoreError::Index {
            index,
            len: self.sizes.len(),
        })
    }

    /// Absolute byte offset of field `index`.
    pub fn field_offset(&self, index: usize) -> Result<usize, StoreError> {
        self.offsets.get(index).copied().ok_or(StoreError::Index {
            index,
            len: self.offsets.len(),
        })
    }

    /// Number of slots the record occupies.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }
}

/// A packed record anchored at a base slot.
#[derive(Debug)]
pub struct Record<'a, 'l, S> {
    kv: &'a mut S,
    key: B256,
    layout: &'l RecordLayout,
}

impl<'a, 'l, S: KeyValueStore> Record<'a, 'l, S> {
    pub(crate) fn new(kv: &'a mut S, key: B256, layout: &'l RecordLayout) -> Self {
        Self { kv, key, layout }
    }

    /// Storage key of the record base.
    pub fn key(&self) -> B256 {
        self.key
    }

    /// The layout this record is viewed through.
    pub fn layout(&self) -> &'l RecordLayout {
        self.layout
    }

    /// Reads field `index` at its exact declared width.
    pub fn get_field(&mut self, index: usize) -> Result<Vec<u8>, StoreError> {
        let size = self.layout.field_size(index)?;
        let offset = self.layout.field_offset(index)?;
        let key = offset_key(self.key, (offset / 32) as u64);
        let word = self.kv.get(key);
        let start = offset % 32;
        Ok(word[start..start + size].to_vec())
    }

    /// Writes field `index`; the payload must match the declared width.
    pub fn set_field(&mut self, index: usize, value: &[u8]) -> Result<(), StoreError> {
        let size = self.layout.field_size(index)?;
        if value.len() != size {
            return Err(StoreError::InvalidFieldSize {
                expected: size,
                got: value.len(),
            });
        }
        let offset = self.layout.field_offset(index)?;
        let key = offset_key(self.key, (offset / 32) as u64);
        let start = offset % 32;
        let mut word = self.kv.get(key);
        word[start..start + size].copy_from_slice(value);
        self.kv.set(key, word);
        Ok(())
    }

    /// The slot containing field `index`.
    ///
    /// Full-word fields read and write through it directly; it also serves
    /// as the anchor for variable-length values derived from the field.
    pub fn field_slot(self, index: usize) -> Result<Slot<'a, S>, StoreError> {
        let offset = self.layout.field_offset(index)?;
        let key = offset_key(self.key, (offset / 32) as u64);
        Ok(Slot::new(self.kv, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::MemoryStore, Datastore};
    use rstest::rstest;

    #[test]
    fn layout_packs_without_straddling() {
        // 20 + 8 fit in slot 0; the 8-byte field at offset 28 would
        // straddle, so it starts at slot 1.
        let layout = RecordLayout::new(&[20, 8, 8, 32, 1]).unwrap();
        assert_eq!(layout.field_offset(0).unwrap(), 0);
        assert_eq!(layout.field_offset(1).unwrap(), 20);
        assert_eq!(layout.field_offset(2).unwrap(), 32);
        // The 32-byte field cannot share slot 1 with the previous field.
        assert_eq!(layout.field_offset(3).unwrap(), 64);
        assert_eq!(layout.field_offset(4).unwrap(), 96);
        assert_eq!(layout.slot_count(), 4);
    }

    #[test]
    fn slot_count_is_ceil_of_final_offset() {
        assert_eq!(RecordLayout::new(&[1]).unwrap().slot_count(), 1);
        assert_eq!(RecordLayout::new(&[32]).unwrap().slot_count(), 1);
        assert_eq!(RecordLayout::new(&[32, 1]).unwrap().slot_count(), 2);
        assert_eq!(RecordLayout::new(&[16, 16, 16]).unwrap().slot_count(), 2);
        assert_eq!(RecordLayout::new(&[]).unwrap().slot_count(), 0);
    }

    #[rstest]
    #[case(0)]
    #[case(33)]
    fn invalid_field_sizes_rejected(#[case] size: usize) {
        assert_eq!(
            RecordLayout::new(&[8, size]),
            Err(StoreError::InvalidLayout { size })
        );
    }

    #[test]
    fn field_roundtrip() {
        let layout = RecordLayout::new(&[20, 8, 8, 32]).unwrap();
        let mut ds = Datastore::new(MemoryStore::new());

        let values: [&[u8]; 4] = [&[0x11; 20], &[0x22; 8], &[0x33; 8], &[0x44; 32]];
        let mut record = ds.get(b"rec").record(&layout);
        for (i, value) in values.iter().enumerate() {
            record.set_field(i, value).unwrap();
        }
        for (i, value) in values.iter().enumerate() {
            assert_eq!(record.get_field(i).unwrap(), *value);
        }
    }

    #[test]
    fn neighbors_in_one_slot_do_not_clobber() {
        let layout = RecordLayout::new(&[8, 8, 8, 8]).unwrap();
        let mut ds = Datastore::new(MemoryStore::new());
        let mut record = ds.get(b"rec").record(&layout);

        record.set_field(0, &1u64.to_be_bytes()).unwrap();
        record.set_field(1, &2u64.to_be_bytes()).unwrap();
        record.set_field(2, &3u64.to_be_bytes()).unwrap();
        record.set_field(3, &4u64.to_be_bytes()).unwrap();
        record.set_field(1, &9u64.to_be_bytes()).unwrap();

        assert_eq!(record.get_field(0).unwrap(), 1u64.to_be_bytes());
        assert_eq!(record.get_field(1).unwrap(), 9u64.to_be_bytes());
        assert_eq!(record.get_field(2).unwrap(), 3u64.to_be_bytes());
        assert_eq!(record.get_field(3).unwrap(), 4u64.to_be_bytes());
    }

    #[test]
    fn index_and_size_errors() {
        let layout = RecordLayout::new(&[8]).unwrap();
        let mut ds = Datastore::new(MemoryStore::new());
        let mut record = ds.get(b"rec").record(&layout);

        assert_eq!(
            record.get_field(1),
            Err(StoreError::Index { index: 1, len: 1 })
        );
        assert_eq!(
            record.set_field(0, &[0u8; 4]),
            Err(StoreError::InvalidFieldSize {
                expected: 8,
                got: 4
            })
        );
    }

    #[test]
    fn word_field_as_slot_and_bytes_anchor() {
        let layout = RecordLayout::new(&[8, 32]).unwrap();
        let mut ds = Datastore::new(MemoryStore::new());

        // The 32-byte field occupies slot 1 of the record; use it as the
        // anchor of a variable-length value.
        let long = [0x77u8; 50];
        ds.get(b"rec")
            .record(&layout)
            .field_slot(1)
            .unwrap()
            .set_bytes(&long);
        assert_eq!(
            ds.get(b"rec")
                .record(&layout)
                .field_slot(1)
                .unwrap()
                .get_bytes(),
            long
        );
    }
}
