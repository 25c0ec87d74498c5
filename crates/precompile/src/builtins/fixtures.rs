//! Arithmetic and storage fixtures exercising the precompile surface end
//! to end.

use crate::{Precompile, PrecompileError};
use alloy_sol_types::{sol, SolCall, SolValue};
use datastore::Datastore;
use env::Environment;
use primitives::Bytes;

sol! {
    function add(uint256 a, uint256 b) external pure returns (uint256);

    function set(bytes32 k1, bytes32 k2, bytes32 value) external;
    function get(bytes32 k1, bytes32 k2) external view returns (bytes32);
}

/// Stateless `uint256` addition; wraps on overflow like EVM arithmetic.
#[derive(Clone, Copy, Debug, Default)]
pub struct Addition;

impl Precompile for Addition {
    fn is_static(&self, _input: &[u8]) -> bool {
        true
    }

    fn run(&self, _env: &mut Environment<'_>, input: &[u8]) -> Result<Bytes, PrecompileError> {
        let call = addCall::abi_decode(input)?;
        let sum = call.a.wrapping_add(call.b);
        Ok(sum.abi_encode().into())
    }
}

/// Double-keyed key-value storage over a nested mapping.
#[derive(Clone, Copy, Debug, Default)]
pub struct KkvStore;

const KKV_ROOT: &[u8] = b"kkv";

impl Precompile for KkvStore {
    fn is_static(&self, input: &[u8]) -> bool {
        input.get(..4) == Some(&getCall::SELECTOR[..])
    }

    fn run(&self, env: &mut Environment<'_>, input: &[u8]) -> Result<Bytes, PrecompileError> {
        let selector: [u8; 4] = input
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or(PrecompileError::UnknownSelector)?;
        match selector {
            s if s == setCall::SELECTOR => {
                let call = setCall::abi_decode(input)?;
                let mut ds = Datastore::persistent(env);
                ds.get(KKV_ROOT)
                    .mapping()
                    .get_nested(&[call.k1.as_slice(), call.k2.as_slice()])
                    .write(call.value);
                bail_on_env_error(env)?;
                Ok(Bytes::new())
            }
            s if s == getCall::SELECTOR => {
                let call = getCall::abi_decode(input)?;
                let mut ds = Datastore::persistent(env);
                let value = ds
                    .get(KKV_ROOT)
                    .mapping()
                    .get_nested(&[call.k1.as_slice(), call.k2.as_slice()])
                    .read();
                bail_on_env_error(env)?;
                Ok(value.abi_encode().into())
            }
            _ => Err(PrecompileError::UnknownSelector),
        }
    }
}

fn bail_on_env_error(env: &Environment<'_>) -> Result<(), PrecompileError> {
    match env.error() {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}
