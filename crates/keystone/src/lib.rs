//! # keystone
//!
//! Stateful native precompiles for Ethereum-style execution engines.
//!
//! A precompile registered with the [`precompile::Registry`] receives an
//! [`env::Environment`] per invocation; every primitive it performs goes
//! through the environment's operation table, which meters gas and
//! enforces the static, trusted and feature policies. The
//! [`datastore`] crates layer typed slots, mappings, arrays, packed
//! records and preimage stores over the flat per-address storage using
//! Solidity-compatible slot derivation.
//!
//! This crate re-exports the workspace members under one roof.
#![cfg_attr(not(feature = "std"), no_std)]

#[doc(inline)]
pub use datastore;
#[doc(inline)]
pub use env;
#[doc(inline)]
pub use precompile;
#[doc(inline)]
pub use primitives;
#[doc(inline)]
pub use state;

pub use env::{EnvConfig, EnvFlags, Environment};
pub use precompile::{Precompile, PrecompileError, Registry};
pub use state::StateDB;
