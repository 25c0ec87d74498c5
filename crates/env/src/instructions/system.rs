//! Self-introspection, hashing, logging and explicit gas use.

use super::{arg_bytes, arg_u64};
use crate::{opcode::OpResult, EnvError, Environment};
use alloc::{vec, vec::Vec};
use primitives::{keccak256, Bytes, Codec, B256};
use state::LogRecord;

pub(crate) fn keccak(_env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let hash = keccak256(arg_bytes(args, 0)?);
    Ok(vec![hash.encode()])
}

pub(crate) fn keccak_gas(env: &mut Environment<'_>, args: &[Bytes]) -> Result<u64, EnvError> {
    let len = arg_bytes(args, 0)?.len() as u64;
    Ok(env.schedule().keccak_cost(len))
}

pub(crate) fn address(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.address().encode()])
}

pub(crate) fn self_balance(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    let address = env.address();
    let balance = env.statedb().balance(address);
    Ok(vec![balance.encode()])
}

pub(crate) fn gas_left(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.gas().remaining().encode()])
}

pub(crate) fn code(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    let address = env.address();
    Ok(vec![env.statedb().code(address)])
}

pub(crate) fn code_size(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    let address = env.address();
    Ok(vec![env.statedb().code_size(address).encode()])
}

pub(crate) fn use_gas(_env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    // The whole cost is the dynamic amount; charging happened in dispatch.
    Ok(Vec::new())
}

pub(crate) fn use_gas_amount(_env: &mut Environment<'_>, args: &[Bytes]) -> Result<u64, EnvError> {
    arg_u64(args, 0)
}

pub(crate) fn log(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let Some((data, topic_args)) = args.split_last() else {
        return Err(EnvError::InvalidInput);
    };
    let mut topics = Vec::with_capacity(topic_args.len());
    for topic in topic_args {
        topics.push(B256::decode(topic).map_err(|_| EnvError::InvalidInput)?);
    }
    let block_number = env.block()?.block_number();
    let record = LogRecord {
        address: env.address(),
        topics,
        data: data.clone(),
        block_number,
    };
    env.statedb().add_log(record);
    Ok(Vec::new())
}

pub(crate) fn log_gas(env: &mut Environment<'_>, args: &[Bytes]) -> Result<u64, EnvError> {
    let Some((data, topics)) = args.split_last() else {
        return Err(EnvError::InvalidInput);
    };
    Ok(env
        .schedule()
        .log_cost(topics.len() as u64, data.len() as u64))
}
