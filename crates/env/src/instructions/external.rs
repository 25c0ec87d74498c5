//! External-address reads and the call/create family.
//!
//! Call operations reserve 1/64 of the remaining budget for the caller,
//! hand the rest (capped by the requested amount) to the host, and credit
//! back whatever the child did not consume. A child failure is returned in
//! the error envelope next to the output, never as a sticky error.

use super::{arg_address, arg_bytes, arg_u256, arg_u64, arg_word};
use crate::{encode_error_envelope, opcode::OpResult, EnvError, Environment};
use alloc::vec;
use primitives::{Bytes, Codec};

pub(crate) fn ext_balance(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let address = arg_address(args, 0)?;
    Ok(vec![env.statedb().balance(address).encode()])
}

pub(crate) fn ext_code(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let address = arg_address(args, 0)?;
    Ok(vec![env.statedb().code(address)])
}

pub(crate) fn ext_code_size(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let address = arg_address(args, 0)?;
    Ok(vec![env.statedb().code_size(address).encode()])
}

pub(crate) fn ext_code_hash(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let address = arg_address(args, 0)?;
    Ok(vec![env.statedb().code_hash(address).encode()])
}

/// Warm/cold pricing for every operation addressing an external account.
pub(crate) fn account_access_gas(
    env: &mut Environment<'_>,
    args: &[Bytes],
) -> Result<u64, EnvError> {
    let address = arg_address(args, 0)?;
    Ok(env.account_access_cost(address))
}

pub(crate) fn call_static(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let address = arg_address(args, 0)?;
    let input = arg_bytes(args, 1)?.clone();
    let gas_requested = arg_u64(args, 2)?;

    let gas_given = env.reserve_child_gas(gas_requested)?;
    let outcome = env.caller()?.call_static(address, &input, gas_given);
    env.credit_child_gas(outcome.gas_remaining);
    Ok(vec![
        outcome.output,
        encode_error_envelope(outcome.error.as_deref()),
    ])
}

pub(crate) fn call(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let address = arg_address(args, 0)?;
    let input = arg_bytes(args, 1)?.clone();
    let gas_requested = arg_u64(args, 2)?;
    let value = arg_u256(args, 3)?;

    let gas_given = env.reserve_child_gas(gas_requested)?;
    let outcome = env.caller()?.call(address, &input, gas_given, value);
    env.credit_child_gas(outcome.gas_remaining);
    Ok(vec![
        outcome.output,
        encode_error_envelope(outcome.error.as_deref()),
    ])
}

pub(crate) fn call_delegate(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let address = arg_address(args, 0)?;
    let input = arg_bytes(args, 1)?.clone();
    let gas_requested = arg_u64(args, 2)?;

    let gas_given = env.reserve_child_gas(gas_requested)?;
    let outcome = env.caller()?.call_delegate(address, &input, gas_given);
    env.credit_child_gas(outcome.gas_remaining);
    Ok(vec![
        outcome.output,
        encode_error_envelope(outcome.error.as_deref()),
    ])
}

pub(crate) fn create(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let input = arg_bytes(args, 0)?.clone();
    let value = arg_u256(args, 1)?;

    let gas_given = env.reserve_child_gas(u64::MAX)?;
    let outcome = env.caller()?.create(&input, gas_given, value);
    env.credit_child_gas(outcome.gas_remaining);
    Ok(vec![
        outcome.address.encode(),
        outcome.output,
        encode_error_envelope(outcome.error.as_deref()),
    ])
}

pub(crate) fn create2(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let input = arg_bytes(args, 0)?.clone();
    let value = arg_u256(args, 1)?;
    let salt = arg_word(args, 2)?;

    let gas_given = env.reserve_child_gas(u64::MAX)?;
    let outcome = env.caller()?.create2(&input, gas_given, value, salt);
    env.credit_child_gas(outcome.gas_remaining);
    Ok(vec![
        outcome.address.encode(),
        outcome.output,
        encode_error_envelope(outcome.error.as_deref()),
    ])
}

pub(crate) fn create_gas(env: &mut Environment<'_>, _args: &[Bytes]) -> Result<u64, EnvError> {
    Ok(env.schedule().create_gas)
}

pub(crate) fn create2_gas(env: &mut Environment<'_>, args: &[Bytes]) -> Result<u64, EnvError> {
    // Salted creation hashes the initcode to derive the address.
    let initcode_len = arg_bytes(args, 0)?.len() as u64;
    let schedule = env.schedule();
    Ok(schedule.create_gas + schedule.keccak_word * initcode_len.div_ceil(32))
}
