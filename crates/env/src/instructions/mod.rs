//! Operation executors and dynamic-gas functions.
//!
//! Split by concern the way the table groups them: meta operations,
//! storage, block and transaction introspection, preimage traffic and
//! external-address operations.

pub(crate) mod block_info;
pub(crate) mod external;
pub(crate) mod meta;
pub(crate) mod preimage;
pub(crate) mod storage;
pub(crate) mod system;
pub(crate) mod tx_info;

use crate::error::EnvError;
use primitives::{Address, Bytes, Codec, B256, U256};

// Argument accessors shared by executors and dynamic-gas functions.
//
// Dynamic gas runs before the signature is validated, so these parse
// defensively and surface `InvalidInput` on malformed arguments.

pub(crate) fn arg_bytes<'a>(args: &'a [Bytes], index: usize) -> Result<&'a Bytes, EnvError> {
    args.get(index).ok_or(EnvError::InvalidInput)
}

pub(crate) fn arg_address(args: &[Bytes], index: usize) -> Result<Address, EnvError> {
    Address::decode(arg_bytes(args, index)?).map_err(|_| EnvError::InvalidInput)
}

pub(crate) fn arg_word(args: &[Bytes], index: usize) -> Result<B256, EnvError> {
    B256::decode(arg_bytes(args, index)?).map_err(|_| EnvError::InvalidInput)
}

pub(crate) fn arg_u64(args: &[Bytes], index: usize) -> Result<u64, EnvError> {
    u64::decode(arg_bytes(args, index)?).map_err(|_| EnvError::InvalidInput)
}

pub(crate) fn arg_u256(args: &[Bytes], index: usize) -> Result<U256, EnvError> {
    U256::decode(arg_bytes(args, index)?).map_err(|_| EnvError::InvalidInput)
}

pub(crate) fn arg_bool(args: &[Bytes], index: usize) -> Result<bool, EnvError> {
    bool::decode(arg_bytes(args, index)?).map_err(|_| EnvError::InvalidInput)
}
