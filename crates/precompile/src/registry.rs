use crate::{metadata::PrecompileMetadata, Precompile};
use alloc::{string::String, sync::Arc, vec::Vec};
use core::fmt;
use primitives::{Address, HashMap, RESERVED_ADDRESS_SPACE};

/// Errors returned by [`Registry::register`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// Addresses below `0x80` belong to the enclosing engine.
    ReservedAddress(Address),
    /// The address already has a precompile starting at this block.
    AlreadyRegistered {
        /// The contested address.
        address: Address,
        /// The contested starting block.
        start_block: u64,
    },
    /// The name is already taken by another address.
    DuplicateName(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReservedAddress(address) => {
                write!(f, "address {address} is reserved for the host")
            }
            Self::AlreadyRegistered {
                address,
                start_block,
            } => write!(
                f,
                "precompile already registered at {address} from block {start_block}"
            ),
            Self::DuplicateName(name) => write!(f, "precompile name {name:?} already registered"),
        }
    }
}

impl core::error::Error for RegistryError {}

struct Entry {
    start_block: u64,
    precompile: Arc<dyn Precompile>,
    metadata: PrecompileMetadata,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("start_block", &self.start_block)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// A block-gated map from addresses to precompiles.
///
/// Each address carries a history of registrations ordered by starting
/// block; a lookup at block `N` resolves to the most recent entry whose
/// start is at or below `N`, in logarithmic time. The registry is built
/// during host setup and is immutable while the blocks it governs
/// execute.
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<Address, Vec<Entry>>,
    names: HashMap<String, Address>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn is_reserved(address: Address) -> bool {
        address[..19].iter().all(|b| *b == 0)
            && (address[19] as u64) < RESERVED_ADDRESS_SPACE
    }

    /// Registers `precompile` at `metadata.address` from `start_block` on.
    pub fn register(
        &mut self,
        start_block: u64,
        metadata: PrecompileMetadata,
        precompile: Arc<dyn Precompile>,
    ) -> Result<(), RegistryError> {
        let address = metadata.address;
        if Self::is_reserved(address) {
            return Err(RegistryError::ReservedAddress(address));
        }
        if let Some(holder) = self.names.get(&metadata.name) {
            if *holder != address {
                return Err(RegistryError::DuplicateName(metadata.name));
            }
        }

        let history = self.entries.entry(address).or_default();
        let position = history.partition_point(|e| e.start_block < start_block);
        if history
            .get(position)
            .is_some_and(|e| e.start_block == start_block)
        {
            return Err(RegistryError::AlreadyRegistered {
                address,
                start_block,
            });
        }
        self.names.insert(metadata.name.clone(), address);
        history.insert(
            position,
            Entry {
                start_block,
                precompile,
                metadata,
            },
        );
        Ok(())
    }

    fn active_entry(&self, address: Address, block: u64) -> Option<&Entry> {
        let history = self.entries.get(&address)?;
        let position = history.partition_point(|e| e.start_block <= block);
        position.checked_sub(1).map(|i| &history[i])
    }

    /// The precompile serving `address` at `block`.
    pub fn lookup(&self, address: Address, block: u64) -> Option<&Arc<dyn Precompile>> {
        self.active_entry(address, block).map(|e| &e.precompile)
    }

    /// Metadata of the precompile serving `address` at `block`.
    pub fn metadata(&self, address: Address, block: u64) -> Option<&PrecompileMetadata> {
        self.active_entry(address, block).map(|e| &e.metadata)
    }

    /// Resolves a precompile name to its address, if active at `block`.
    pub fn lookup_by_name(&self, name: &str, block: u64) -> Option<Address> {
        let address = *self.names.get(name)?;
        self.active_entry(address, block).map(|_| address)
    }

    /// Addresses with an active precompile at `block`, sorted.
    pub fn addresses(&self, block: u64) -> Vec<Address> {
        let mut out: Vec<Address> = self
            .entries
            .keys()
            .copied()
            .filter(|address| self.active_entry(*address, block).is_some())
            .collect();
        out.sort();
        out
    }

    /// Metadata of every active precompile at `block`, sorted by address.
    pub fn active_metadata(&self, block: u64) -> Vec<&PrecompileMetadata> {
        self.addresses(block)
            .into_iter()
            .filter_map(|address| self.metadata(address, block))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrecompileError;
    use env::Environment;
    use primitives::{u64_to_address, Bytes};

    struct Fixed(&'static [u8]);

    impl Precompile for Fixed {
        fn is_static(&self, _input: &[u8]) -> bool {
            true
        }

        fn run(
            &self,
            _env: &mut Environment<'_>,
            _input: &[u8],
        ) -> Result<Bytes, PrecompileError> {
            Ok(Bytes::from_static(self.0))
        }
    }

    fn meta(address: Address, name: &str) -> PrecompileMetadata {
        PrecompileMetadata::new(address, name, "test fixture")
    }

    #[test]
    fn block_gating_picks_latest_active() {
        let mut registry = Registry::new();
        let address = u64_to_address(0x100);
        registry
            .register(10, meta(address, "v1"), Arc::new(Fixed(b"one")))
            .unwrap();
        registry
            .register(20, meta(address, "v2"), Arc::new(Fixed(b"two")))
            .unwrap();

        assert!(registry.lookup(address, 9).is_none());
        assert_eq!(registry.metadata(address, 10).unwrap().name, "v1");
        assert_eq!(registry.metadata(address, 19).unwrap().name, "v1");
        assert_eq!(registry.metadata(address, 20).unwrap().name, "v2");
        assert_eq!(registry.metadata(address, 1_000_000).unwrap().name, "v2");
    }

    #[test]
    fn out_of_order_registration_still_sorted() {
        let mut registry = Registry::new();
        let address = u64_to_address(0x100);
        registry
            .register(30, meta(address, "late"), Arc::new(Fixed(b"l")))
            .unwrap();
        registry
            .register(10, meta(address, "early"), Arc::new(Fixed(b"e")))
            .unwrap();
        assert_eq!(registry.metadata(address, 15).unwrap().name, "early");
        assert_eq!(registry.metadata(address, 30).unwrap().name, "late");
    }

    #[test]
    fn reserved_addresses_rejected() {
        let mut registry = Registry::new();
        for reserved in [0u64, 1, 0x7f] {
            let address = u64_to_address(reserved);
            assert_eq!(
                registry.register(0, meta(address, "nope"), Arc::new(Fixed(b""))),
                Err(RegistryError::ReservedAddress(address))
            );
        }
        // 0x80 is the first claimable address.
        registry
            .register(0, meta(u64_to_address(0x80), "ok"), Arc::new(Fixed(b"")))
            .unwrap();
    }

    #[test]
    fn duplicate_start_block_rejected() {
        let mut registry = Registry::new();
        let address = u64_to_address(0x100);
        registry
            .register(5, meta(address, "a"), Arc::new(Fixed(b"")))
            .unwrap();
        assert_eq!(
            registry.register(5, meta(address, "a"), Arc::new(Fixed(b""))),
            Err(RegistryError::AlreadyRegistered {
                address,
                start_block: 5
            })
        );
    }

    #[test]
    fn names_resolve_and_collide() {
        let mut registry = Registry::new();
        let a = u64_to_address(0x100);
        let b = u64_to_address(0x101);
        registry
            .register(0, meta(a, "adder"), Arc::new(Fixed(b"")))
            .unwrap();
        assert_eq!(registry.lookup_by_name("adder", 0), Some(a));
        assert_eq!(registry.lookup_by_name("adder", u64::MAX), Some(a));
        assert_eq!(
            registry.register(0, meta(b, "adder"), Arc::new(Fixed(b""))),
            Err(RegistryError::DuplicateName("adder".into()))
        );
    }

    #[test]
    fn address_listing_respects_block() {
        let mut registry = Registry::new();
        let a = u64_to_address(0x100);
        let b = u64_to_address(0x101);
        registry.register(0, meta(a, "a"), Arc::new(Fixed(b""))).unwrap();
        registry.register(50, meta(b, "b"), Arc::new(Fixed(b""))).unwrap();

        assert_eq!(registry.addresses(10), [a]);
        assert_eq!(registry.addresses(50), [a, b]);
        assert_eq!(registry.active_metadata(50).len(), 2);
    }
}
