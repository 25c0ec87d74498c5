//! The host seam for cross-contract calls and creations.

use alloc::{boxed::Box, string::String};
use auto_impl::auto_impl;
use primitives::{Address, Bytes, B256, U256};

/// Result of a call issued back into the host.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallOutcome {
    /// Output bytes of the callee.
    pub output: Bytes,
    /// Gas the callee did not consume; credited back to the caller.
    pub gas_remaining: u64,
    /// Error reported by the callee, if any.
    pub error: Option<String>,
}

/// Result of a creation issued back into the host.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CreateOutcome {
    /// Address of the created contract, zero on failure.
    pub address: Address,
    /// Output bytes of the initcode.
    pub output: Bytes,
    /// Gas the initcode did not consume; credited back to the caller.
    pub gas_remaining: u64,
    /// Error reported by the creation, if any.
    pub error: Option<String>,
}

/// Synchronous re-entry into the enclosing engine.
///
/// The host may run EVM code or further precompiles under a fresh
/// environment; control returns here when the inner frame completes.
#[auto_impl(&mut, Box)]
pub trait Caller {
    /// Read-only call into `address`.
    fn call_static(&mut self, address: Address, input: &[u8], gas: u64) -> CallOutcome;

    /// Call into `address`, transferring `value`.
    fn call(&mut self, address: Address, input: &[u8], gas: u64, value: U256) -> CallOutcome;

    /// Call into `address` with the caller's own storage context.
    fn call_delegate(&mut self, address: Address, input: &[u8], gas: u64) -> CallOutcome;

    /// Creates a contract from `input`.
    fn create(&mut self, input: &[u8], gas: u64, value: U256) -> CreateOutcome;

    /// Creates a contract from `input` at the salted address.
    fn create2(&mut self, input: &[u8], gas: u64, value: U256, salt: B256) -> CreateOutcome;
}
