//! Persistent and ephemeral storage operations.
//!
//! Persistent access is coupled to the transaction access list: pricing a
//! cold slot warms it, so the dynamic-gas functions mutate state by design
//! of the warm/cold scheme.

use super::arg_word;
use crate::{opcode::OpResult, EnvError, Environment};
use alloc::{vec, vec::Vec};
use primitives::{Bytes, Codec};

pub(crate) fn sload(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let key = arg_word(args, 0)?;
    let address = env.address();
    let value = env.statedb().persistent_state(address, key);
    Ok(vec![value.encode()])
}

pub(crate) fn sload_gas(env: &mut Environment<'_>, args: &[Bytes]) -> Result<u64, EnvError> {
    let key = arg_word(args, 0)?;
    Ok(env.slot_access_cost(key))
}

pub(crate) fn sstore(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let key = arg_word(args, 0)?;
    let value = arg_word(args, 1)?;
    let address = env.address();
    env.statedb().set_persistent_state(address, key, value);
    Ok(Vec::new())
}

pub(crate) fn sstore_gas(env: &mut Environment<'_>, args: &[Bytes]) -> Result<u64, EnvError> {
    let key = arg_word(args, 0)?;
    let new = arg_word(args, 1)?;
    let schedule = *env.schedule();

    let cold_cost = match env.slot_is_warm(key) {
        true => 0,
        false => schedule.cold_sload_cost,
    };

    let address = env.address();
    let current = env.statedb().persistent_state(address, key);
    let write_cost = if current == new {
        schedule.warm_storage_read_cost
    } else if current.is_zero() {
        schedule.sstore_set_gas
    } else {
        if new.is_zero() {
            env.statedb().add_refund(schedule.sstore_clears_refund);
        }
        schedule.sstore_reset_gas
    };

    Ok(cold_cost + write_cost)
}

pub(crate) fn tload(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    env.require_ephemeral()?;
    let key = arg_word(args, 0)?;
    let address = env.address();
    let value = env.statedb().ephemeral_state(address, key);
    Ok(vec![value.encode()])
}

pub(crate) fn tstore(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    env.require_ephemeral()?;
    let key = arg_word(args, 0)?;
    let value = arg_word(args, 1)?;
    let address = env.address();
    env.statedb().set_ephemeral_state(address, key, value);
    Ok(Vec::new())
}

pub(crate) fn ephemeral_gas(env: &mut Environment<'_>, _args: &[Bytes]) -> Result<u64, EnvError> {
    Ok(env.schedule().ephemeral_access_cost)
}
