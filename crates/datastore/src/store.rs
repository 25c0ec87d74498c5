use env::Environment;
use primitives::{HashMap, B256};

/// A flat 32-byte key to 32-byte value store.
///
/// The two environment-backed flavors route through the storage opcodes,
/// so gas, access-list warming and the static policy apply per access.
/// Reads take `&mut self` because pricing a cold slot warms it.
pub trait KeyValueStore {
    /// Writes a word.
    fn set(&mut self, key: B256, value: B256);

    /// Reads a word, zero if never written.
    fn get(&mut self, key: B256) -> B256;
}

/// Persistent storage of the environment's own address.
///
/// A failed environment reads as zero and swallows writes; the sticky
/// error stays inspectable on the environment itself.
#[derive(Debug)]
pub struct PersistentStore<'a, 'e> {
    env: &'a mut Environment<'e>,
}

impl<'a, 'e> PersistentStore<'a, 'e> {
    /// Wraps an environment's persistent storage.
    pub fn new(env: &'a mut Environment<'e>) -> Self {
        Self { env }
    }
}

impl KeyValueStore for PersistentStore<'_, '_> {
    fn set(&mut self, key: B256, value: B256) {
        let _ = self.env.storage_store(key, value);
    }

    fn get(&mut self, key: B256) -> B256 {
        self.env.storage_load(key).unwrap_or_default()
    }
}

/// Ephemeral storage of the environment's own address.
#[derive(Debug)]
pub struct EphemeralStore<'a, 'e> {
    env: &'a mut Environment<'e>,
}

impl<'a, 'e> EphemeralStore<'a, 'e> {
    /// Wraps an environment's ephemeral storage.
    pub fn new(env: &'a mut Environment<'e>) -> Self {
        Self { env }
    }
}

impl KeyValueStore for EphemeralStore<'_, '_> {
    fn set(&mut self, key: B256, value: B256) {
        let _ = self.env.ephemeral_store(key, value);
    }

    fn get(&mut self, key: B256) -> B256 {
        self.env.ephemeral_load(key).unwrap_or_default()
    }
}

/// A free-standing in-memory store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slots: HashMap<B256, B256>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn set(&mut self, key: B256, value: B256) {
        self.slots.insert(key, value);
    }

    fn get(&mut self, key: B256) -> B256 {
        self.slots.get(&key).copied().unwrap_or_default()
    }
}
