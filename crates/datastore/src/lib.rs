//! # keystone-datastore
//!
//! A structured data model layered over a flat 32-byte key to 32-byte
//! value store: typed slots, keyed mappings, dynamic and fixed
//! multi-dimensional arrays, variable-length byte values and packed
//! records, plus the content-addressed preimage stores.
//!
//! Slot locations follow the Solidity storage hashing discipline so the
//! layouts interoperate with on-chain contracts. One deliberate exception:
//! [`DynamicArray`] places element `i` in the mapping slot of the 32-byte
//! big-endian index, not in Solidity's contiguous region. Solidity-side
//! readers of such arrays must use the keyed scheme.
//!
//! All handles are cheap views holding a store borrow and a base key;
//! locations are pure functions of the derivation path, so a handle can be
//! dropped and re-derived at any time.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod array;
mod bytes;
mod error;
mod map;
mod preimages;
mod record;
mod slot;
mod store;

pub use array::{BytesArray, DynamicArray, SlotArray};
pub use error::StoreError;
pub use map::{Mapping, MappingKey};
pub use preimages::{BigPreimageStore, EnvPreimageStore, MemoryPreimageStore, PreimageStore};
pub use record::{Record, RecordLayout};
pub use slot::{Datastore, Slot, SlotExt};
pub use store::{EphemeralStore, KeyValueStore, MemoryStore, PersistentStore};
