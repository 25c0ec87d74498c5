use crate::{LogRecord, StateDB};
use primitives::{Address, Bytes, B256, U256};

/// A [`StateDB`] wrapper that panics on every write.
///
/// Hand one of these to code that must only observe state. A read-only
/// phase misusing its handle is a host programming error, not a runtime
/// condition to recover from.
#[derive(Debug)]
pub struct ReadOnlyStateDB<S>(pub S);

/// A [`StateDB`] wrapper for commit-phase housekeeping.
///
/// Persistent slot writes panic; ephemeral and preimage writes pass
/// through, as do log appends and refund accounting.
#[derive(Debug)]
pub struct CommitSafeStateDB<S>(pub S);

macro_rules! forward_reads {
    () => {
        fn persistent_state(&self, address: Address, key: B256) -> B256 {
            self.0.persistent_state(address, key)
        }

        fn ephemeral_state(&self, address: Address, key: B256) -> B256 {
            self.0.ephemeral_state(address, key)
        }

        fn persistent_preimage(&self, hash: B256) -> Bytes {
            self.0.persistent_preimage(hash)
        }

        fn persistent_preimage_size(&self, hash: B256) -> u64 {
            self.0.persistent_preimage_size(hash)
        }

        fn ephemeral_preimage(&self, hash: B256) -> Bytes {
            self.0.ephemeral_preimage(hash)
        }

        fn ephemeral_preimage_size(&self, hash: B256) -> u64 {
            self.0.ephemeral_preimage_size(hash)
        }

        fn address_in_access_list(&self, address: Address) -> bool {
            self.0.address_in_access_list(address)
        }

        fn slot_in_access_list(&self, address: Address, slot: B256) -> bool {
            self.0.slot_in_access_list(address, slot)
        }

        fn add_address_to_access_list(&mut self, address: Address) {
            self.0.add_address_to_access_list(address)
        }

        fn add_slot_to_access_list(&mut self, address: Address, slot: B256) {
            self.0.add_slot_to_access_list(address, slot)
        }

        fn balance(&self, address: Address) -> U256 {
            self.0.balance(address)
        }

        fn code(&self, address: Address) -> Bytes {
            self.0.code(address)
        }

        fn code_size(&self, address: Address) -> u64 {
            self.0.code_size(address)
        }

        fn code_hash(&self, address: Address) -> B256 {
            self.0.code_hash(address)
        }

        fn refund(&self) -> u64 {
            self.0.refund()
        }
    };
}

impl<S: StateDB> StateDB for ReadOnlyStateDB<S> {
    forward_reads!();

    fn set_persistent_state(&mut self, _address: Address, _key: B256, _value: B256) {
        panic!("persistent write through a read-only StateDB");
    }

    fn set_ephemeral_state(&mut self, _address: Address, _key: B256, _value: B256) {
        panic!("ephemeral write through a read-only StateDB");
    }

    fn add_persistent_preimage(&mut self, _preimage: &[u8]) {
        panic!("preimage write through a read-only StateDB");
    }

    fn add_ephemeral_preimage(&mut self, _preimage: &[u8]) {
        panic!("preimage write through a read-only StateDB");
    }

    fn add_log(&mut self, _log: LogRecord) {
        panic!("log append through a read-only StateDB");
    }

    fn add_refund(&mut self, _gas: u64) {
        panic!("refund through a read-only StateDB");
    }

    fn sub_refund(&mut self, _gas: u64) {
        panic!("refund through a read-only StateDB");
    }
}

impl<S: StateDB> StateDB for CommitSafeStateDB<S> {
    forward_reads!();

    fn set_persistent_state(&mut self, _address: Address, _key: B256, _value: B256) {
        panic!("persistent write through a commit-safe StateDB");
    }

    fn set_ephemeral_state(&mut self, address: Address, key: B256, value: B256) {
        self.0.set_ephemeral_state(address, key, value)
    }

    fn add_persistent_preimage(&mut self, preimage: &[u8]) {
        self.0.add_persistent_preimage(preimage)
    }

    fn add_ephemeral_preimage(&mut self, preimage: &[u8]) {
        self.0.add_ephemeral_preimage(preimage)
    }

    fn add_log(&mut self, log: LogRecord) {
        self.0.add_log(log)
    }

    fn add_refund(&mut self, gas: u64) {
        self.0.add_refund(gas)
    }

    fn sub_refund(&mut self, gas: u64) {
        self.0.sub_refund(gas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStateDB;
    use primitives::u64_to_address;

    #[test]
    fn read_only_forwards_reads() {
        let mut inner = MemoryStateDB::new();
        let addr = u64_to_address(1);
        inner.set_persistent_state(addr, B256::ZERO, B256::with_last_byte(5));
        let db = ReadOnlyStateDB(inner);
        assert_eq!(db.persistent_state(addr, B256::ZERO), B256::with_last_byte(5));
    }

    #[test]
    #[should_panic(expected = "read-only")]
    fn read_only_rejects_writes() {
        let mut db = ReadOnlyStateDB(MemoryStateDB::new());
        db.set_persistent_state(u64_to_address(1), B256::ZERO, B256::ZERO);
    }

    #[test]
    #[should_panic(expected = "commit-safe")]
    fn commit_safe_rejects_persistent_writes() {
        let mut db = CommitSafeStateDB(MemoryStateDB::new());
        db.set_persistent_state(u64_to_address(1), B256::ZERO, B256::ZERO);
    }

    #[test]
    fn commit_safe_permits_ephemeral_and_preimages() {
        let mut db = CommitSafeStateDB(MemoryStateDB::new());
        let addr = u64_to_address(1);
        db.set_ephemeral_state(addr, B256::ZERO, B256::with_last_byte(1));
        db.add_persistent_preimage(b"ok");
        assert_eq!(db.ephemeral_state(addr, B256::ZERO), B256::with_last_byte(1));
        assert_eq!(db.persistent_preimage_size(primitives::keccak256(b"ok")), 2);
    }
}
