use crate::{AccessList, LogRecord, StateDB};
use alloc::vec::Vec;
use primitives::{keccak256, Address, Bytes, HashMap, B256, KECCAK_EMPTY, U256};

/// Account metadata tracked by [`MemoryStateDB`].
#[derive(Clone, Debug, Default)]
struct Account {
    balance: U256,
    code: Bytes,
}

/// A complete in-memory [`StateDB`].
///
/// Backs the test suites and host-less embeddings; everything lives in hash
/// maps and nothing survives the value being dropped.
#[derive(Clone, Debug, Default)]
pub struct MemoryStateDB {
    persistent: HashMap<(Address, B256), B256>,
    ephemeral: HashMap<(Address, B256), B256>,
    persistent_preimages: HashMap<B256, Bytes>,
    ephemeral_preimages: HashMap<B256, Bytes>,
    accounts: HashMap<Address, Account>,
    access_list: AccessList,
    logs: Vec<LogRecord>,
    refund: u64,
}

impl MemoryStateDB {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the balance of `address`.
    pub fn set_balance(&mut self, address: Address, balance: U256) {
        self.accounts.entry(address).or_default().balance = balance;
    }

    /// Sets the code of `address`.
    pub fn set_code(&mut self, address: Address, code: Bytes) {
        self.accounts.entry(address).or_default().code = code;
    }

    /// Logs recorded so far, in append order.
    pub fn logs(&self) -> &[LogRecord] {
        &self.logs
    }

    /// Discards all ephemeral state and ephemeral preimages.
    ///
    /// Hosts call this at their transaction or block boundary.
    pub fn clear_ephemeral(&mut self) {
        self.ephemeral.clear();
        self.ephemeral_preimages.clear();
    }
}

impl StateDB for MemoryStateDB {
    fn persistent_state(&self, address: Address, key: B256) -> B256 {
        self.persistent
            .get(&(address, key))
            .copied()
            .unwrap_or_default()
    }

    fn set_persistent_state(&mut self, address: Address, key: B256, value: B256) {
        self.persistent.insert((address, key), value);
    }

    fn ephemeral_state(&self, address: Address, key: B256) -> B256 {
        self.ephemeral
            .get(&(address, key))
            .copied()
            .unwrap_or_default()
    }

    fn set_ephemeral_state(&mut self, address: Address, key: B256, value: B256) {
        self.ephemeral.insert((address, key), value);
    }

    fn add_persistent_preimage(&mut self, preimage: &[u8]) {
        self.persistent_preimages
            .insert(keccak256(preimage), Bytes::copy_from_slice(preimage));
    }

    fn persistent_preimage(&self, hash: B256) -> Bytes {
        self.persistent_preimages
            .get(&hash)
            .cloned()
            .unwrap_or_default()
    }

    fn persistent_preimage_size(&self, hash: B256) -> u64 {
        self.persistent_preimages
            .get(&hash)
            .map_or(0, |b| b.len() as u64)
    }

    fn add_ephemeral_preimage(&mut self, preimage: &[u8]) {
        self.ephemeral_preimages
            .insert(keccak256(preimage), Bytes::copy_from_slice(preimage));
    }

    fn ephemeral_preimage(&self, hash: B256) -> Bytes {
        self.ephemeral_preimages
            .get(&hash)
            .cloned()
            .unwrap_or_default()
    }

    fn ephemeral_preimage_size(&self, hash: B256) -> u64 {
        self.ephemeral_preimages
            .get(&hash)
            .map_or(0, |b| b.len() as u64)
    }

    fn address_in_access_list(&self, address: Address) -> bool {
        self.access_list.contains_address(address)
    }

    fn slot_in_access_list(&self, address: Address, slot: B256) -> bool {
        self.access_list.contains_slot(address, slot)
    }

    fn add_address_to_access_list(&mut self, address: Address) {
        self.access_list.add_address(address);
    }

    fn add_slot_to_access_list(&mut self, address: Address, slot: B256) {
        self.access_list.add_slot(address, slot);
    }

    fn balance(&self, address: Address) -> U256 {
        self.accounts.get(&address).map_or(U256::ZERO, |a| a.balance)
    }

    fn code(&self, address: Address) -> Bytes {
        self.accounts
            .get(&address)
            .map(|a| a.code.clone())
            .unwrap_or_default()
    }

    fn code_hash(&self, address: Address) -> B256 {
        self.accounts
            .get(&address)
            .map_or(KECCAK_EMPTY, |a| keccak256(&a.code))
    }

    fn add_log(&mut self, log: LogRecord) {
        self.logs.push(log);
    }

    fn add_refund(&mut self, gas: u64) {
        self.refund += gas;
    }

    fn sub_refund(&mut self, gas: u64) {
        self.refund = self.refund.saturating_sub(gas);
    }

    fn refund(&self) -> u64 {
        self.refund
    }
}
