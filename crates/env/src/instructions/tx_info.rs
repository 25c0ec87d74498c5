//! Transaction and call-frame introspection operations.
//!
//! All of these require a call context; issuing them without one yields
//! [`EnvError::NoData`](crate::EnvError::NoData).

use crate::{opcode::OpResult, Environment};
use alloc::vec;
use primitives::{Bytes, Codec};

pub(crate) fn gas_price(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.call_context()?.tx_gas_price().encode()])
}

pub(crate) fn origin(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.call_context()?.tx_origin().encode()])
}

pub(crate) fn call_data(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.call_context()?.call_data()])
}

pub(crate) fn call_data_size(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.call_context()?.call_data_size().encode()])
}

pub(crate) fn caller(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.call_context()?.caller().encode()])
}

pub(crate) fn call_value(env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    Ok(vec![env.call_context()?.call_value().encode()])
}
