//! # keystone-state
//!
//! The state access contract consumed by the Keystone environment, an
//! in-memory implementation of it, and the write-guard wrappers used when a
//! precompile runs in a restricted phase.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod access_list;
mod guards;
mod memory;
mod statedb;

pub use access_list::AccessList;
pub use guards::{CommitSafeStateDB, ReadOnlyStateDB};
pub use memory::MemoryStateDB;
pub use statedb::{LogRecord, StateDB};
