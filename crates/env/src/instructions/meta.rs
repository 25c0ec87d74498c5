//! Trusted meta operations: gas-metering toggle, debug messages, time.

use super::{arg_bool, arg_bytes};
use crate::{opcode::OpResult, EnvError, Environment};
use alloc::{string::String, vec, vec::Vec};
use primitives::{Bytes, Codec};

pub(crate) fn metering(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let on = arg_bool(args, 0)?;
    env.set_metering(on);
    Ok(Vec::new())
}

pub(crate) fn debug(env: &mut Environment<'_>, args: &[Bytes]) -> OpResult {
    let message = String::from_utf8_lossy(arg_bytes(args, 0)?).into_owned();
    env.push_debug_message(message);
    Ok(Vec::new())
}

pub(crate) fn time_now(_env: &mut Environment<'_>, _args: &[Bytes]) -> OpResult {
    let now = unix_now()?;
    Ok(vec![now.encode()])
}

#[cfg(feature = "std")]
fn unix_now() -> Result<u64, EnvError> {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(|_| EnvError::NoData)
}

/// Wall-clock time needs a host clock; there is none without std.
#[cfg(not(feature = "std"))]
fn unix_now() -> Result<u64, EnvError> {
    Err(EnvError::NoData)
}
