use alloc::{boxed::Box, vec::Vec};
use auto_impl::auto_impl;
use primitives::{Address, Bytes, B256, U256};

/// A log record appended by a precompile invocation.
///
/// Topics and data follow the engine's log semantics; the block number is
/// stamped from the invocation's block context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogRecord {
    /// Address the log is attributed to.
    pub address: Address,
    /// Indexed topics, at most four.
    pub topics: Vec<B256>,
    /// Unindexed payload.
    pub data: Bytes,
    /// Block the record was emitted in.
    pub block_number: u64,
}

/// State services the enclosing engine provides to precompile executions.
///
/// Implementations maintain four maps (persistent state, ephemeral state,
/// persistent preimages, ephemeral preimages) plus the transaction access
/// list, per-account metadata and the log record list.
///
/// Persistent state and persistent preimages are consensus state. Ephemeral
/// state and ephemeral preimages are scoped to the current transaction or
/// block and discarded afterwards per host policy.
///
/// Reads of absent keys return the zero word or the empty byte string;
/// `add_*_preimage` registers the value under its keccak-256 hash.
#[auto_impl(&mut, Box)]
pub trait StateDB {
    /// Reads a persistent storage slot.
    fn persistent_state(&self, address: Address, key: B256) -> B256;

    /// Writes a persistent storage slot.
    fn set_persistent_state(&mut self, address: Address, key: B256, value: B256);

    /// Reads an ephemeral storage slot.
    fn ephemeral_state(&self, address: Address, key: B256) -> B256;

    /// Writes an ephemeral storage slot.
    fn set_ephemeral_state(&mut self, address: Address, key: B256, value: B256);

    /// Registers `preimage` in the persistent preimage map under
    /// `keccak256(preimage)`.
    fn add_persistent_preimage(&mut self, preimage: &[u8]);

    /// Loads a persistent preimage, empty if absent.
    fn persistent_preimage(&self, hash: B256) -> Bytes;

    /// Size in bytes of a persistent preimage, zero if absent.
    fn persistent_preimage_size(&self, hash: B256) -> u64;

    /// Registers `preimage` in the ephemeral preimage map under
    /// `keccak256(preimage)`.
    fn add_ephemeral_preimage(&mut self, preimage: &[u8]);

    /// Loads an ephemeral preimage, empty if absent.
    fn ephemeral_preimage(&self, hash: B256) -> Bytes;

    /// Size in bytes of an ephemeral preimage, zero if absent.
    fn ephemeral_preimage_size(&self, hash: B256) -> u64;

    /// Whether `address` is warm in the transaction access list.
    fn address_in_access_list(&self, address: Address) -> bool;

    /// Whether `(address, slot)` is warm in the transaction access list.
    fn slot_in_access_list(&self, address: Address, slot: B256) -> bool;

    /// Warms an address.
    fn add_address_to_access_list(&mut self, address: Address);

    /// Warms a storage slot.
    fn add_slot_to_access_list(&mut self, address: Address, slot: B256);

    /// Balance of `address`.
    fn balance(&self, address: Address) -> U256;

    /// Code of `address`, empty for accounts without code.
    fn code(&self, address: Address) -> Bytes;

    /// Code size of `address`.
    fn code_size(&self, address: Address) -> u64 {
        self.code(address).len() as u64
    }

    /// Code hash of `address`.
    fn code_hash(&self, address: Address) -> B256;

    /// Appends a log record.
    fn add_log(&mut self, log: LogRecord);

    /// Adds to the transaction gas-refund counter.
    fn add_refund(&mut self, gas: u64);

    /// Subtracts from the transaction gas-refund counter.
    fn sub_refund(&mut self, gas: u64);

    /// Current value of the gas-refund counter.
    fn refund(&self) -> u64;
}
