//! The flat and Merkle preimage registry precompiles.

use crate::{Precompile, PrecompileError};
use alloy_sol_types::{sol, SolCall, SolValue};
use datastore::{BigPreimageStore, EnvPreimageStore, StoreError};
use env::Environment;
use primitives::{Bytes, EMPTY_PREIMAGE_HASH, U256};

sol! {
    function addPreimage(bytes data) external returns (bytes32);
    function hasPreimage(bytes32 hash) external view returns (bool);
    function getPreimageSize(bytes32 hash) external view returns (uint256);
    function getPreimage(bytes32 hash) external view returns (bytes);
}

fn selector(input: &[u8]) -> Result<[u8; 4], PrecompileError> {
    input
        .get(..4)
        .and_then(|s| s.try_into().ok())
        .ok_or(PrecompileError::UnknownSelector)
}

/// The flat preimage registry.
///
/// `addPreimage` stores the value under its keccak-256 hash; the empty
/// input resolves to the fixed empty-preimage hash without touching
/// state, and that hash always reports as present.
#[derive(Clone, Copy, Debug, Default)]
pub struct PreimageRegistry;

impl Precompile for PreimageRegistry {
    fn is_static(&self, input: &[u8]) -> bool {
        selector(input).is_ok_and(|s| s != addPreimageCall::SELECTOR)
    }

    fn run(&self, env: &mut Environment<'_>, input: &[u8]) -> Result<Bytes, PrecompileError> {
        match selector(input)? {
            s if s == addPreimageCall::SELECTOR => {
                let call = addPreimageCall::abi_decode(input)?;
                let hash = env.add_preimage(&call.data)?;
                Ok(hash.abi_encode().into())
            }
            s if s == hasPreimageCall::SELECTOR => {
                let call = hasPreimageCall::abi_decode(input)?;
                let present = call.hash == EMPTY_PREIMAGE_HASH
                    || env.preimage_size(call.hash)? != 0;
                Ok(present.abi_encode().into())
            }
            s if s == getPreimageSizeCall::SELECTOR => {
                let call = getPreimageSizeCall::abi_decode(input)?;
                let size = env.preimage_size(call.hash)?;
                Ok(U256::from(size).abi_encode().into())
            }
            s if s == getPreimageCall::SELECTOR => {
                let call = getPreimageCall::abi_decode(input)?;
                if call.hash != EMPTY_PREIMAGE_HASH && env.preimage_size(call.hash)? == 0 {
                    return Err(StoreError::PreimageNotFound(call.hash).into());
                }
                let preimage = env.get_preimage(call.hash)?;
                Ok(preimage.abi_encode().into())
            }
            _ => Err(PrecompileError::UnknownSelector),
        }
    }
}

/// The big preimage registry.
///
/// Same ABI as [`PreimageRegistry`], backed by the Merkle-radix store:
/// `addPreimage` returns the tree root and `getPreimage` reassembles the
/// value from its leaves.
#[derive(Clone, Copy, Debug)]
pub struct BigPreimageRegistry {
    radix: usize,
    leaf_size: usize,
}

impl BigPreimageRegistry {
    /// Creates a registry with the given tree fanout and leaf size.
    pub fn new(radix: usize, leaf_size: usize) -> Self {
        Self { radix, leaf_size }
    }

    fn store<'a, 'e>(
        &self,
        env: &'a mut Environment<'e>,
    ) -> BigPreimageStore<EnvPreimageStore<'a, 'e>> {
        BigPreimageStore::new(EnvPreimageStore::persistent(env), self.radix, self.leaf_size)
    }
}

impl Default for BigPreimageRegistry {
    fn default() -> Self {
        Self::new(16, 64)
    }
}

fn bail_on_env_error(env: &Environment<'_>) -> Result<(), PrecompileError> {
    match env.error() {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}

impl Precompile for BigPreimageRegistry {
    fn is_static(&self, input: &[u8]) -> bool {
        selector(input).is_ok_and(|s| s != addPreimageCall::SELECTOR)
    }

    fn run(&self, env: &mut Environment<'_>, input: &[u8]) -> Result<Bytes, PrecompileError> {
        let output = match selector(input)? {
            s if s == addPreimageCall::SELECTOR => {
                let call = addPreimageCall::abi_decode(input)?;
                let root = self.store(env).add(&call.data);
                root.abi_encode().into()
            }
            s if s == hasPreimageCall::SELECTOR => {
                let call = hasPreimageCall::abi_decode(input)?;
                let present = self.store(env).has(call.hash);
                present.abi_encode().into()
            }
            s if s == getPreimageSizeCall::SELECTOR => {
                let call = getPreimageSizeCall::abi_decode(input)?;
                let size = self.store(env).size(call.hash);
                U256::from(size).abi_encode().into()
            }
            s if s == getPreimageCall::SELECTOR => {
                let call = getPreimageCall::abi_decode(input)?;
                let value: Bytes = self.store(env).get(call.hash)?.into();
                value.abi_encode().into()
            }
            _ => return Err(PrecompileError::UnknownSelector),
        };
        // The store adapters read a failed environment as zeros; surface
        // the sticky error instead of a fabricated result.
        bail_on_env_error(env)?;
        Ok(output)
    }
}
