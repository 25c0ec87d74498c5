//! Block introspection operations.
//!
//! All of these require a block context; issuing them without one yields
//! [`EnvError::NoData`](crate::EnvError::NoData).

use super::arg_u64;
use crate::{opcode::OpResult, Environment};
use alloc::vec;
use primitives::{Bytes, Codec};

pub(crate) fn block_number(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.block()?.block_number().encode()])
}

pub(crate) fn timestamp(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.block()?.timestamp().encode()])
}

pub(crate) fn gas_limit(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.block()?.gas_limit().encode()])
}

pub(crate) fn difficulty(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.block()?.difficulty().encode()])
}

pub(crate) fn base_fee(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.block()?.base_fee().encode()])
}

pub(crate) fn coinbase(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.block()?.coinbase().encode()])
}

pub(crate) fn prevrandao(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.block()?.random().encode()])
}

pub(crate) fn block_hash(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let number = arg_u64(args, 0)?;
    Ok(vec![env.block()?.block_hash(number).encode()])
}
