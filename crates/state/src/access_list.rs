use primitives::{Address, HashSet, B256};

/// Warmed addresses and storage slots for one transaction.
///
/// Membership lowers the gas charged on subsequent accesses; warming is a
/// one-way operation for the lifetime of the transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessList {
    addresses: HashSet<Address>,
    slots: HashSet<(Address, B256)>,
}

impl AccessList {
    /// Creates an empty access list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `address` is warm.
    pub fn contains_address(&self, address: Address) -> bool {
        self.addresses.contains(&address)
    }

    /// Whether `(address, slot)` is warm.
    ///
    /// Slot warmth does not imply address warmth; the two sets are
    /// tracked independently, mirroring EIP-2930 access lists.
    pub fn contains_slot(&self, address: Address, slot: B256) -> bool {
        self.slots.contains(&(address, slot))
    }

    /// Warms `address`.
    pub fn add_address(&mut self, address: Address) {
        self.addresses.insert(address);
    }

    /// Warms `(address, slot)`.
    pub fn add_slot(&mut self, address: Address, slot: B256) {
        self.slots.insert((address, slot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::u64_to_address;

    #[test]
    fn warming_is_sticky() {
        let mut list = AccessList::new();
        let addr = u64_to_address(0xc0);
        let slot = B256::with_last_byte(7);

        assert!(!list.contains_address(addr));
        assert!(!list.contains_slot(addr, slot));

        list.add_address(addr);
        list.add_slot(addr, slot);

        assert!(list.contains_address(addr));
        assert!(list.contains_slot(addr, slot));

        // Re-adding stays warm.
        list.add_slot(addr, slot);
        assert!(list.contains_slot(addr, slot));
    }

    #[test]
    fn slot_warmth_is_per_address() {
        let mut list = AccessList::new();
        let slot = B256::with_last_byte(1);
        list.add_slot(u64_to_address(0xa0), slot);
        assert!(!list.contains_slot(u64_to_address(0xa1), slot));
    }
}
