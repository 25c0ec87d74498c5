//! A counter precompile: one persistent slot, an event per increment,
//! and a read-only getter, wired through the registry and the host glue.

use alloy_sol_types::{sol, SolCall, SolValue};
use keystone::{
    datastore::Datastore,
    env::Environment,
    precompile::{Precompile, PrecompileError},
    primitives::{keccak256, Bytes, B256, U256},
};

sol! {
    function increment() external returns (uint256);
    function count() external view returns (uint256);
}

const COUNT_KEY: &[u8] = b"count";

/// A monotone counter with an increment event.
#[derive(Clone, Copy, Debug, Default)]
pub struct Counter;

impl Counter {
    /// Topic of the increment event.
    pub fn incremented_topic() -> B256 {
        keccak256(b"Incremented(uint256)")
    }
}

impl Precompile for Counter {
    fn is_static(&self, input: &[u8]) -> bool {
        input.get(..4) == Some(&countCall::SELECTOR[..])
    }

    fn run(&self, env: &mut Environment<'_>, input: &[u8]) -> Result<Bytes, PrecompileError> {
        let selector: [u8; 4] = input
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or(PrecompileError::UnknownSelector)?;
        match selector {
            s if s == incrementCall::SELECTOR => {
                let next = {
                    let mut ds = Datastore::persistent(env);
                    let mut slot = ds.get(COUNT_KEY);
                    let next = slot.get_u256() + U256::from(1u8);
                    slot.set_u256(next);
                    next
                };
                // A swallowed datastore failure is sticky on the
                // environment, so the log dispatch surfaces it.
                env.log(&[Self::incremented_topic()], &next.to_be_bytes::<32>())?;
                Ok(next.abi_encode().into())
            }
            s if s == countCall::SELECTOR => {
                let mut ds = Datastore::persistent(env);
                let count = ds.get(COUNT_KEY).get_u256();
                if let Some(err) = env.error() {
                    return Err(err.clone().into());
                }
                Ok(count.abi_encode().into())
            }
            _ => Err(PrecompileError::UnknownSelector),
        }
    }
}
