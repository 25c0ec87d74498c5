//! Reference dispatch glue between an enclosing engine and the registry.
//!
//! Hosts with their own frame machinery only need the pieces: look the
//! precompile up for `(address, block)`, build an environment from the
//! invocation parameters and the registry's trust marking, and run it
//! through the wrapper. [`call_precompile`] is that sequence in one place.

use crate::{run_precompile, PrecompileOutput, Registry};
use env::{BlockContext, CallContext, Caller, EnvConfig, EnvFlags, Environment, GasSchedule};
use primitives::{Address, Bytes};
use state::StateDB;

/// Host-side parameters of one precompile invocation.
#[derive(Clone, Copy)]
pub struct Invocation<'a> {
    /// Block height the invocation executes at; gates the registry lookup.
    pub block_number: u64,
    /// Gas budget of the invocation.
    pub gas_limit: u64,
    /// Whether the invocation arrives through a static call.
    pub is_static: bool,
    /// Features the host enables, from the ephemeral/preimage flags.
    pub features: EnvFlags,
    /// Gas policy values of the deployment.
    pub schedule: GasSchedule,
    /// Block context, when the host has one.
    pub block: Option<&'a dyn BlockContext>,
    /// Call context, when the host has one.
    pub call: Option<&'a dyn CallContext>,
}

impl core::fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Invocation")
            .field("block_number", &self.block_number)
            .field("gas_limit", &self.gas_limit)
            .field("is_static", &self.is_static)
            .field("features", &self.features)
            .finish_non_exhaustive()
    }
}

impl Invocation<'_> {
    /// An invocation at `block_number` with the given budget, no static
    /// restriction, all features on and the default schedule.
    pub fn new(block_number: u64, gas_limit: u64) -> Self {
        Self {
            block_number,
            gas_limit,
            is_static: false,
            features: EnvFlags::EPHEMERAL | EnvFlags::PREIMAGES,
            schedule: GasSchedule::default(),
            block: None,
            call: None,
        }
    }
}

/// Dispatches one precompile call.
///
/// Returns `None` when no precompile is registered for `(address,
/// block_number)`, in which case the host falls through to its ordinary
/// call handling. A static call into an input the precompile does not
/// declare static reverts without executing.
pub fn call_precompile(
    registry: &Registry,
    statedb: &mut dyn StateDB,
    caller: Option<&mut dyn Caller>,
    invocation: Invocation<'_>,
    address: Address,
    input: &[u8],
) -> Option<PrecompileOutput> {
    let precompile = registry.lookup(address, invocation.block_number)?.clone();
    let metadata = registry.metadata(address, invocation.block_number)?;

    if invocation.is_static && !precompile.is_static(input) {
        return Some(PrecompileOutput::new_reverted(
            0,
            Bytes::from_static(b"write protection"),
        ));
    }

    let mut flags = invocation.features;
    if invocation.is_static {
        flags |= EnvFlags::STATIC;
    }
    if metadata.trusted {
        flags |= EnvFlags::TRUSTED;
    }

    let config = EnvConfig {
        address,
        flags,
        gas_limit: invocation.gas_limit,
        schedule: invocation.schedule,
    };
    let mut env = Environment::new(config, statedb);
    if let Some(block) = invocation.block {
        env = env.with_block_context(block);
    }
    if let Some(call) = invocation.call {
        env = env.with_call_context(call);
    }
    if let Some(caller) = caller {
        env = env.with_caller(caller);
    }

    Some(run_precompile(&*precompile, &mut env, input))
}
