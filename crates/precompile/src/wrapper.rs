//! The host-side run wrapper.
//!
//! Converts `run` errors into reverts carrying the message bytes, and
//! contains runtime panics: a panic payload marked as an explicit revert
//! becomes a normal revert with gas preserved, anything else forfeits the
//! entire gas allowance.

use crate::Precompile;
use alloc::string::ToString;
use env::Environment;
use primitives::Bytes;
use std::panic::{self, AssertUnwindSafe};

/// Panic payload marking a deliberate revert raised from precompile code.
#[derive(Clone, Debug)]
pub struct ExplicitRevert(pub Bytes);

/// Raises an explicit revert out of precompile code.
///
/// The wrapper turns it into a normal revert with the given return data
/// and the remaining gas preserved.
pub fn revert(data: impl Into<Bytes>) -> ! {
    panic::panic_any(ExplicitRevert(data.into()))
}

/// Outcome of one wrapped precompile invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrecompileOutput {
    /// Return bytes, or the revert message.
    pub bytes: Bytes,
    /// Gas consumed by the invocation.
    pub gas_used: u64,
    /// Whether the invocation reverted.
    pub reverted: bool,
}

impl PrecompileOutput {
    /// A successful output.
    pub fn new(gas_used: u64, bytes: Bytes) -> Self {
        Self {
            bytes,
            gas_used,
            reverted: false,
        }
    }

    /// A reverted output.
    pub fn new_reverted(gas_used: u64, bytes: Bytes) -> Self {
        Self {
            bytes,
            gas_used,
            reverted: true,
        }
    }
}

/// Runs a precompile under the host policy.
pub fn run_precompile(
    precompile: &dyn Precompile,
    env: &mut Environment<'_>,
    input: &[u8],
) -> PrecompileOutput {
    let result = panic::catch_unwind(AssertUnwindSafe(|| precompile.run(env, input)));
    match result {
        Ok(Ok(bytes)) => PrecompileOutput::new(env.gas().spent(), bytes),
        Ok(Err(err)) => PrecompileOutput::new_reverted(
            env.gas().spent(),
            Bytes::from(err.to_string().into_bytes()),
        ),
        Err(payload) => match payload.downcast::<ExplicitRevert>() {
            Ok(marker) => PrecompileOutput::new_reverted(env.gas().spent(), marker.0),
            Err(_) => {
                // An unmarked panic is indistinguishable from a broken
                // invariant; the invocation forfeits its whole allowance.
                env.spend_all_gas();
                PrecompileOutput::new_reverted(env.gas().spent(), Bytes::new())
            }
        },
    }
}

/// Runs a precompile's end-of-block hook under the host policy.
///
/// Hosts typically hand the environment a
/// [`CommitSafeStateDB`](state::CommitSafeStateDB) here: finalisation may
/// touch ephemeral state and preimages but not consensus slots.
pub fn finalise_precompile(
    precompile: &dyn Precompile,
    env: &mut Environment<'_>,
) -> PrecompileOutput {
    run_hook(precompile, env, Hook::Finalise)
}

/// Runs a precompile's commit hook under the host policy.
pub fn commit_precompile(
    precompile: &dyn Precompile,
    env: &mut Environment<'_>,
) -> PrecompileOutput {
    run_hook(precompile, env, Hook::Commit)
}

#[derive(Clone, Copy)]
enum Hook {
    Finalise,
    Commit,
}

fn run_hook(
    precompile: &dyn Precompile,
    env: &mut Environment<'_>,
    hook: Hook,
) -> PrecompileOutput {
    let result = panic::catch_unwind(AssertUnwindSafe(|| match hook {
        Hook::Finalise => precompile.finalise(env),
        Hook::Commit => precompile.commit(env),
    }));
    match result {
        Ok(Ok(())) => PrecompileOutput::new(env.gas().spent(), Bytes::new()),
        Ok(Err(err)) => PrecompileOutput::new_reverted(
            env.gas().spent(),
            Bytes::from(err.to_string().into_bytes()),
        ),
        Err(payload) => match payload.downcast::<ExplicitRevert>() {
            Ok(marker) => PrecompileOutput::new_reverted(env.gas().spent(), marker.0),
            Err(_) => {
                env.spend_all_gas();
                PrecompileOutput::new_reverted(env.gas().spent(), Bytes::new())
            }
        },
    }
}
