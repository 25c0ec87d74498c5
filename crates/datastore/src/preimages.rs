//! Content-addressed preimage stores.
//!
//! The flat [`PreimageStore`] registers byte strings under their keccak-256
//! hash. [`BigPreimageStore`] layers a radix Merkle tree over a flat store
//! for values that should not travel as one blob: leaves carry chunks of
//! the value, internal nodes carry the hashes of their children, and a
//! keyed size map records the byte length per root.

use crate::{map, store::KeyValueStore, StoreError};
use alloc::vec::Vec;
use env::Environment;
use primitives::{pad_key, Bytes, HashMap, B256, EMPTY_PREIMAGE_HASH, U256};

/// A registry of byte strings keyed by their keccak-256 hash.
///
/// The empty preimage is always present under [`EMPTY_PREIMAGE_HASH`] and
/// is never written to the backing store.
pub trait PreimageStore {
    /// Registers `preimage` and returns its content hash.
    fn add_preimage(&mut self, preimage: &[u8]) -> B256;

    /// Loads a preimage, empty if absent.
    fn get_preimage(&mut self, hash: B256) -> Bytes;

    /// Size of a preimage in bytes, zero if absent.
    fn preimage_size(&mut self, hash: B256) -> u64;

    /// Whether a preimage is registered under `hash`.
    fn has_preimage(&mut self, hash: B256) -> bool {
        hash == EMPTY_PREIMAGE_HASH || self.preimage_size(hash) != 0
    }
}

/// Which state maps of the environment a store routes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flavor {
    Persistent,
    Ephemeral,
}

/// The environment-backed flat preimage store.
///
/// Routes through the preimage opcodes, so gas and the feature and trust
/// policies apply per access; a failed environment reads as absent. The
/// store doubles as a [`KeyValueStore`] over the matching storage flavor,
/// which is what [`BigPreimageStore`] uses for its size map.
#[derive(Debug)]
pub struct EnvPreimageStore<'a, 'e> {
    env: &'a mut Environment<'e>,
    flavor: Flavor,
}

impl<'a, 'e> EnvPreimageStore<'a, 'e> {
    /// A store over the persistent preimage map.
    pub fn persistent(env: &'a mut Environment<'e>) -> Self {
        Self {
            env,
            flavor: Flavor::Persistent,
        }
    }

    /// A store over the ephemeral preimage map. Trusted environments only.
    pub fn ephemeral(env: &'a mut Environment<'e>) -> Self {
        Self {
            env,
            flavor: Flavor::Ephemeral,
        }
    }
}

impl PreimageStore for EnvPreimageStore<'_, '_> {
    fn add_preimage(&mut self, preimage: &[u8]) -> B256 {
        let result = match self.flavor {
            Flavor::Persistent => self.env.add_preimage(preimage),
            Flavor::Ephemeral => self.env.add_ephemeral_preimage(preimage),
        };
        result.unwrap_or(EMPTY_PREIMAGE_HASH)
    }

    fn get_preimage(&mut self, hash: B256) -> Bytes {
        let result = match self.flavor {
            Flavor::Persistent => self.env.get_preimage(hash),
            Flavor::Ephemeral => self.env.get_ephemeral_preimage(hash),
        };
        result.unwrap_or_default()
    }

    fn preimage_size(&mut self, hash: B256) -> u64 {
        let result = match self.flavor {
            Flavor::Persistent => self.env.preimage_size(hash),
            Flavor::Ephemeral => self.env.ephemeral_preimage_size(hash),
        };
        result.unwrap_or(0)
    }
}

impl KeyValueStore for EnvPreimageStore<'_, '_> {
    fn set(&mut self, key: B256, value: B256) {
        let _ = match self.flavor {
            Flavor::Persistent => self.env.storage_store(key, value),
            Flavor::Ephemeral => self.env.ephemeral_store(key, value),
        };
    }

    fn get(&mut self, key: B256) -> B256 {
        let result = match self.flavor {
            Flavor::Persistent => self.env.storage_load(key),
            Flavor::Ephemeral => self.env.ephemeral_load(key),
        };
        result.unwrap_or_default()
    }
}

/// A free-standing in-memory preimage store with a slot map, for tests and
/// host-less embedding.
#[derive(Clone, Debug, Default)]
pub struct MemoryPreimageStore {
    preimages: HashMap<B256, Bytes>,
    slots: HashMap<B256, B256>,
}

impl MemoryPreimageStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreimageStore for MemoryPreimageStore {
    fn add_preimage(&mut self, preimage: &[u8]) -> B256 {
        if preimage.is_empty() {
            return EMPTY_PREIMAGE_HASH;
        }
        let hash = primitives::keccak256(preimage);
        self.preimages.insert(hash, Bytes::copy_from_slice(preimage));
        hash
    }

    fn get_preimage(&mut self, hash: B256) -> Bytes {
        self.preimages.get(&hash).cloned().unwrap_or_default()
    }

    fn preimage_size(&mut self, hash: B256) -> u64 {
        self.preimages.get(&hash).map_or(0, |p| p.len() as u64)
    }
}

impl KeyValueStore for MemoryPreimageStore {
    fn set(&mut self, key: B256, value: B256) {
        self.slots.insert(key, value);
    }

    fn get(&mut self, key: B256) -> B256 {
        self.slots.get(&key).copied().unwrap_or_default()
    }
}

const LEAF_TAG: u8 = 0x00;
const NODE_TAG: u8 = 0x01;

fn size_anchor() -> B256 {
    pad_key(b"preimage.size")
}

/// A Merkle-radix store for preimages too large for one registry entry.
///
/// `add` splits the value into `leaf_size`-byte chunks, registers each as
/// `0x00 ‖ chunk`, then reduces hash levels in groups of `radix` with
/// internal nodes `0x01 ‖ h₁‖…‖h_k` until a single root remains. The same
/// input always reduces to the same root. The backend provides both the
/// flat registry for tree nodes and the slot map for recorded sizes.
#[derive(Debug)]
pub struct BigPreimageStore<B> {
    backend: B,
    radix: usize,
    leaf_size: usize,
}

impl<B: PreimageStore + KeyValueStore> BigPreimageStore<B> {
    /// Creates a store with the given fanout and maximum leaf size.
    ///
    /// `radix` must be at least 2 and `leaf_size` at least 1.
    pub fn new(backend: B, radix: usize, leaf_size: usize) -> Self {
        assert!(radix >= 2, "radix must be at least 2");
        assert!(leaf_size >= 1, "leaf size must be at least 1");
        Self {
            backend,
            radix,
            leaf_size,
        }
    }

    /// The backend the tree nodes and size map live in.
    pub fn inner(&mut self) -> &mut B {
        &mut self.backend
    }

    fn size_key(root: B256) -> B256 {
        map::child_key(size_anchor(), root.as_slice())
    }

    /// Registers `preimage`, returning the Merkle root.
    pub fn add(&mut self, preimage: &[u8]) -> B256 {
        if preimage.is_empty() {
            return EMPTY_PREIMAGE_HASH;
        }

        let mut level: Vec<B256> = preimage
            .chunks(self.leaf_size)
            .map(|chunk| {
                let mut node = Vec::with_capacity(1 + chunk.len());
                node.push(LEAF_TAG);
                node.extend_from_slice(chunk);
                self.backend.add_preimage(&node)
            })
            .collect();

        while level.len() > 1 {
            level = level
                .chunks(self.radix)
                .map(|children| {
                    let mut node = Vec::with_capacity(1 + children.len() * 32);
                    node.push(NODE_TAG);
                    for child in children {
                        node.extend_from_slice(child.as_slice());
                    }
                    self.backend.add_preimage(&node)
                })
                .collect();
        }

        let root = level[0];
        self.backend.set(
            Self::size_key(root),
            B256::from(U256::from(preimage.len() as u64)),
        );
        root
    }

    /// Reassembles the value under `root` bit for bit.
    pub fn get(&mut self, root: B256) -> Result<Vec<u8>, StoreError> {
        if root == EMPTY_PREIMAGE_HASH {
            return Ok(Vec::new());
        }
        let mut out = Vec::with_capacity(self.size(root) as usize);
        self.assemble(root, &mut out)?;
        Ok(out)
    }

    fn assemble(&mut self, hash: B256, out: &mut Vec<u8>) -> Result<(), StoreError> {
        let node = self.backend.get_preimage(hash);
        let Some((&tag, body)) = node.split_first() else {
            return Err(StoreError::PreimageNotFound(hash));
        };
        match tag {
            LEAF_TAG => {
                out.extend_from_slice(body);
                Ok(())
            }
            NODE_TAG => {
                if body.len() % 32 != 0 {
                    return Err(StoreError::PreimageNotFound(hash));
                }
                for child in body.chunks(32) {
                    self.assemble(B256::from_slice(child), out)?;
                }
                Ok(())
            }
            _ => Err(StoreError::PreimageNotFound(hash)),
        }
    }

    /// Byte length recorded for `root`, zero if unknown.
    pub fn size(&mut self, root: B256) -> u64 {
        let word = self.backend.get(Self::size_key(root));
        let mut out = [0u8; 8];
        out.copy_from_slice(&word[24..]);
        u64::from_be_bytes(out)
    }

    /// Whether a value is registered under `root`.
    pub fn has(&mut self, root: B256) -> bool {
        root == EMPTY_PREIMAGE_HASH || self.size(root) != 0
    }
}

impl<B: PreimageStore + KeyValueStore> PreimageStore for BigPreimageStore<B> {
    fn add_preimage(&mut self, preimage: &[u8]) -> B256 {
        self.add(preimage)
    }

    fn get_preimage(&mut self, hash: B256) -> Bytes {
        self.get(hash).map(Into::into).unwrap_or_default()
    }

    fn preimage_size(&mut self, hash: B256) -> u64 {
        self.size(hash)
    }

    fn has_preimage(&mut self, hash: B256) -> bool {
        self.has(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitives::keccak256;
    use rand::RngCore;

    fn big_store(radix: usize, leaf: usize) -> BigPreimageStore<MemoryPreimageStore> {
        BigPreimageStore::new(MemoryPreimageStore::new(), radix, leaf)
    }

    #[test]
    fn flat_store_contract() {
        let mut store = MemoryPreimageStore::new();
        let data = b"test.data";
        let hash = store.add_preimage(data);
        assert_eq!(hash, keccak256(data));
        assert!(store.has_preimage(hash));
        assert_eq!(store.preimage_size(hash), 9);
        assert_eq!(store.get_preimage(hash).as_ref(), data);
    }

    #[test]
    fn empty_preimage_always_present() {
        let mut store = MemoryPreimageStore::new();
        assert!(store.has_preimage(EMPTY_PREIMAGE_HASH));
        assert_eq!(store.add_preimage(b""), EMPTY_PREIMAGE_HASH);
        assert_eq!(store.preimage_size(EMPTY_PREIMAGE_HASH), 0);
    }

    #[test]
    fn random_blob_roundtrip() {
        let mut store = big_store(16, 64);
        let mut blob = alloc::vec![0u8; 200];
        rand::rng().fill_bytes(&mut blob);

        let root = store.add(&blob);
        assert_eq!(store.get(root).unwrap(), blob);
        assert_eq!(store.size(root), 200);
        assert!(store.has(root));
    }

    #[test]
    fn intermediate_nodes_are_queryable() {
        let mut store = big_store(16, 64);
        let blob = [0x5au8; 200];
        let root = store.add(&blob);

        // The root node itself is a flat-registry entry tagged as an
        // internal node; each referenced child resolves.
        let node = store.inner().get_preimage(root);
        assert_eq!(node[0], NODE_TAG);
        let children: Vec<B256> = node[1..].chunks(32).map(B256::from_slice).collect();
        assert_eq!(children.len(), 4);
        for child in children {
            let leaf = store.inner().get_preimage(child);
            assert_eq!(leaf[0], LEAF_TAG);
        }
    }

    #[test]
    fn add_is_deterministic() {
        let mut store = big_store(16, 64);
        let blob = [7u8; 500];
        assert_eq!(store.add(&blob), store.add(&blob));
    }

    #[test]
    fn deep_tree_reduces_to_single_root() {
        // radix 2, leaf 1: five leaves force three reduction levels.
        let mut store = big_store(2, 1);
        let blob = *b"miner";
        let root = store.add(&blob);
        assert_eq!(store.get(root).unwrap(), blob);
        assert_eq!(store.size(root), 5);
    }

    #[test]
    fn single_leaf_blob() {
        let mut store = big_store(16, 64);
        let blob = b"fits in one leaf";
        let root = store.add(blob);
        assert_eq!(root, keccak256([&[LEAF_TAG], &blob[..]].concat()));
        assert_eq!(store.get(root).unwrap(), blob);
    }

    #[test]
    fn empty_blob_is_the_empty_preimage() {
        let mut store = big_store(16, 64);
        assert_eq!(store.add(b""), EMPTY_PREIMAGE_HASH);
        assert_eq!(store.get(EMPTY_PREIMAGE_HASH).unwrap(), Vec::<u8>::new());
        assert!(store.has(EMPTY_PREIMAGE_HASH));
    }

    #[test]
    fn unknown_root_is_not_found() {
        let mut store = big_store(16, 64);
        let missing = B256::with_last_byte(9);
        assert_eq!(
            store.get(missing),
            Err(StoreError::PreimageNotFound(missing))
        );
        assert!(!store.has(missing));
    }
}
