//! Preimage registry operations.
//!
//! Registering the empty byte string is a no-op that yields the fixed
//! empty-preimage hash; the flat registry never stores an entry for it.

use super::{arg_bytes, arg_word};
use crate::{opcode::OpResult, EnvError, Environment};
use alloc::vec;
use primitives::{keccak256, Bytes, Codec, EMPTY_PREIMAGE_HASH};

pub(crate) fn store(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    env.require_preimages()?;
    let preimage = arg_bytes(args, 0)?;
    if preimage.is_empty() {
        return Ok(vec![EMPTY_PREIMAGE_HASH.encode()]);
    }
    let hash = keccak256(preimage);
    env.statedb().add_persistent_preimage(preimage);
    Ok(vec![hash.encode()])
}

pub(crate) fn load(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    env.require_preimages()?;
    let hash = arg_word(args, 0)?;
    if hash == EMPTY_PREIMAGE_HASH {
        return Ok(vec![Bytes::new()]);
    }
    Ok(vec![env.statedb().persistent_preimage(hash)])
}

pub(crate) fn size(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    env.require_preimages()?;
    let hash = arg_word(args, 0)?;
    Ok(vec![env.statedb().persistent_preimage_size(hash).encode()])
}

pub(crate) fn ephemeral_store(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    env.require_preimages()?;
    env.require_ephemeral()?;
    let preimage = arg_bytes(args, 0)?;
    if preimage.is_empty() {
        return Ok(vec![EMPTY_PREIMAGE_HASH.encode()]);
    }
    let hash = keccak256(preimage);
    env.statedb().add_ephemeral_preimage(preimage);
    Ok(vec![hash.encode()])
}

pub(crate) fn ephemeral_load(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    env.require_preimages()?;
    env.require_ephemeral()?;
    let hash = arg_word(args, 0)?;
    if hash == EMPTY_PREIMAGE_HASH {
        return Ok(vec![Bytes::new()]);
    }
    Ok(vec![env.statedb().ephemeral_preimage(hash)])
}

pub(crate) fn ephemeral_size(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    env.require_preimages()?;
    env.require_ephemeral()?;
    let hash = arg_word(args, 0)?;
    Ok(vec![env.statedb().ephemeral_preimage_size(hash).encode()])
}

pub(crate) fn store_gas(env: &mut Environment<'_>, args: &[Bytes]) -> Result<u64, EnvError> {
    let len = arg_bytes(args, 0)?.len() as u64;
    Ok(env.schedule().preimage_store_cost(len))
}

pub(crate) fn load_gas(env: &mut Environment<'_>, args: &[Bytes]) -> Result<u64, EnvError> {
    let hash = arg_word(args, 0)?;
    let len = env.statedb().persistent_preimage_size(hash);
    Ok(env.schedule().preimage_load_cost(len))
}

pub(crate) fn ephemeral_load_gas(
    env: &mut Environment<'_>,
    args: &[Bytes],
) -> Result<u64, EnvError> {
    let hash = arg_word(args, 0)?;
    let len = env.statedb().ephemeral_preimage_size(hash);
    Ok(env.schedule().preimage_load_cost(len))
}

pub(crate) fn size_gas(env: &mut Environment<'_>, _args: &[Bytes]) -> Result<u64, EnvError> {
    Ok(env.schedule().preimage_size_cost)
}
