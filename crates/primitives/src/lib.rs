//! # keystone-primitives
//!
//! Primitive types shared across the Keystone crates, plus the fixed-width
//! codecs used on the opcode boundary and in precompile ABIs.
//!
//! Most types are re-exports from [`alloy_primitives`]; this crate adds the
//! exact-width encode/decode discipline and a handful of constants.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod codec;
pub mod constants;
mod utilities;

pub use codec::{Codec, CodecError};
pub use constants::*;
pub use utilities::{index_key, pad_key, u64_to_address};

// Re-export the alloy types that form the vocabulary of the whole workspace.
pub use alloy_primitives::{
    self, address, b256, bytes,
    hex,
    map::{self, HashMap, HashSet},
    keccak256, Address, Bytes, FixedBytes, Log, LogData, B256, I256, U256,
};
