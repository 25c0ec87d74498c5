//! Behavioral properties of the structured overlay, exercised through the
//! public API over an in-memory store.

use keystone_datastore::{Datastore, MemoryStore, RecordLayout, SlotExt};
use primitives::{keccak256, pad_key, B256, U256};
use rand::RngCore;
use rstest::rstest;

fn ds() -> Datastore<MemoryStore> {
    Datastore::new(MemoryStore::new())
}

#[test]
fn any_written_slot_reads_back() {
    let mut ds = ds();
    let mut rng = rand::rng();
    for _ in 0..64 {
        let mut key = [0u8; 24];
        rng.fill_bytes(&mut key);
        let mut value = [0u8; 32];
        rng.fill_bytes(&mut value);
        let value = B256::from(value);
        ds.get(&key).write(value);
        assert_eq!(ds.get(&key).read(), value);
    }
}

#[rstest]
#[case(&[][..])]
#[case(b"k")]
#[case(&[0xau8; 32])]
fn short_keys_address_their_padded_word(#[case] key: &[u8]) {
    let mut ds = ds();
    assert_eq!(ds.get(key).key(), pad_key(key));
    let mut expected = B256::ZERO;
    expected[..key.len()].copy_from_slice(key);
    assert_eq!(ds.get(key).key(), expected);
}

#[rstest]
#[case(33)]
#[case(64)]
#[case(257)]
fn long_keys_address_their_hash(#[case] len: usize) {
    let mut ds = ds();
    let key = vec![0x5au8; len];
    assert_eq!(ds.get(&key).key(), keccak256(&key));
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(30)]
#[case(31)]
#[case(32)]
#[case(33)]
#[case(63)]
#[case(64)]
#[case(65)]
#[case(1024)]
fn byte_values_round_trip_across_the_form_boundary(#[case] len: usize) {
    let mut ds = ds();
    let mut value = vec![0u8; len];
    rand::rng().fill_bytes(&mut value);

    ds.get(b"blob").set_bytes(&value);
    assert_eq!(ds.get(b"blob").get_bytes(), value);

    // The anchor's low-bit parity discriminates the representation.
    let anchor = ds.get(b"blob").read();
    assert_eq!(anchor[31] & 1 == 1, len >= 32);
}

#[test]
fn shrinking_a_byte_value_hides_the_old_tail() {
    let mut ds = ds();
    ds.get(b"blob").set_bytes(&[0x11u8; 100]);
    ds.get(b"blob").set_bytes(b"tiny");
    assert_eq!(ds.get(b"blob").get_bytes(), b"tiny");
    ds.get(b"blob").set_bytes(&[0x22u8; 40]);
    assert_eq!(ds.get(b"blob").get_bytes(), [0x22u8; 40]);
}

#[test]
fn dynamic_array_push_get_pop_sequence() {
    let mut ds = ds();
    let values: Vec<B256> = (0..20u8).map(B256::with_last_byte).collect();

    for value in &values {
        ds.get(b"list").dyn_array().push().write(*value);
    }
    assert_eq!(ds.get(b"list").dyn_array().len(), 20);
    for (i, value) in values.iter().enumerate() {
        assert_eq!(
            ds.get(b"list").dyn_array().get(i as u64).unwrap().read(),
            *value
        );
    }

    for value in values.iter().rev() {
        let mut popped = ds.get(b"list").dyn_array().pop().unwrap();
        assert_eq!(popped.read(), *value);
    }
    assert!(ds.get(b"list").dyn_array().is_empty());
    assert!(ds.get(b"list").dyn_array().pop().is_none());
}

#[test]
fn slot_array_null_handles_do_not_touch_state() {
    let mut ds = ds();
    let mut grid = ds.get(b"grid").slot_array(&[4, 4]);
    grid.write(&[4, 0], B256::with_last_byte(1));
    grid.write(&[0, 4], B256::with_last_byte(1));
    drop(grid);

    let mut none = ds.get(b"grid").slot_array(&[4, 4]).get(&[9, 9]);
    assert_eq!(none.read_or_zero(), B256::ZERO);
    none.write_or_ignore(B256::with_last_byte(7));

    // Nothing leaked into the in-range cells.
    let mut grid = ds.get(b"grid").slot_array(&[4, 4]);
    for i in 0..4 {
        for j in 0..4 {
            assert_eq!(grid.read(&[i, j]), B256::ZERO);
        }
    }
}

#[rstest]
#[case(&[1])]
#[case(&[32])]
#[case(&[20, 8, 8])]
#[case(&[16, 16, 16, 16])]
#[case(&[31, 2, 31])]
#[case(&[32, 32, 32])]
#[case(&[1, 1, 1, 1, 1, 30, 5])]
fn record_fields_round_trip_and_never_straddle(#[case] sizes: &[usize]) {
    let layout = RecordLayout::new(sizes).unwrap();
    let mut ds = ds();
    let mut rng = rand::rng();

    let payloads: Vec<Vec<u8>> = sizes
        .iter()
        .map(|&w| {
            let mut buf = vec![0u8; w];
            rng.fill_bytes(&mut buf);
            buf
        })
        .collect();

    let mut record = ds.get(b"rec").record(&layout);
    for (i, payload) in payloads.iter().enumerate() {
        record.set_field(i, payload).unwrap();
    }
    for (i, payload) in payloads.iter().enumerate() {
        assert_eq!(&record.get_field(i).unwrap(), payload);
    }

    for (i, &size) in sizes.iter().enumerate() {
        let offset = layout.field_offset(i).unwrap();
        // A field never crosses a word boundary.
        assert_eq!(offset / 32, (offset + size - 1) / 32);
    }
    assert_eq!(
        layout.slot_count(),
        layout
            .field_offset(sizes.len() - 1)
            .map(|last| (last + sizes[sizes.len() - 1]).div_ceil(32))
            .unwrap()
    );
}

#[test]
fn mapping_locations_are_stable_across_derivations() {
    let mut ds = ds();
    let first = ds.get(b"m").mapping().get_nested(&[b"x", b"y"]).key();
    let second = ds
        .get(b"m")
        .mapping()
        .nested(b"x")
        .get(b"y")
        .key();
    assert_eq!(first, second);

    // Writing through one path is visible through the other.
    ds.get(b"m")
        .mapping()
        .get_nested(&[b"x", b"y"])
        .set_u256(U256::from(77u8));
    assert_eq!(
        ds.get(b"m").mapping().nested(b"x").get(b"y").get_u256(),
        U256::from(77u8)
    );
}
