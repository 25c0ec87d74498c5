//! # keystone-precompile
//!
//! The contract a stateful precompile implements, the block-gated registry
//! that maps addresses to precompiles, the host-side run wrapper and the
//! built-in precompiles.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod builtins;
mod error;
#[cfg(feature = "std")]
mod host;
mod metadata;
mod registry;
#[cfg(feature = "std")]
mod wrapper;

pub use error::PrecompileError;
#[cfg(feature = "std")]
pub use host::{call_precompile, Invocation};
pub use metadata::{
    PrecompileMetadata, FRAMEWORK_NAME, FRAMEWORK_SOURCE, FRAMEWORK_VERSION,
};
pub use registry::{Registry, RegistryError};
#[cfg(feature = "std")]
pub use wrapper::{
    commit_precompile, finalise_precompile, revert, run_precompile, ExplicitRevert,
    PrecompileOutput,
};

use alloc::boxed::Box;
use env::Environment;
use primitives::Bytes;

/// A stateful native precompile.
///
/// One instance serves every invocation at its address, potentially from
/// many host threads at once; implementations keep their state in the
/// environment's storage, never in `self`.
pub trait Precompile: Send + Sync {
    /// Whether the host may invoke this input under a static call.
    fn is_static(&self, input: &[u8]) -> bool;

    /// Executes the precompile against the invocation's environment.
    fn run(&self, env: &mut Environment<'_>, input: &[u8]) -> Result<Bytes, PrecompileError>;

    /// End-of-block housekeeping, called once per block the precompile
    /// executed in.
    fn finalise(&self, env: &mut Environment<'_>) -> Result<(), PrecompileError> {
        let _ = env;
        Ok(())
    }

    /// Commit-phase housekeeping, called when the block's state is sealed.
    fn commit(&self, env: &mut Environment<'_>) -> Result<(), PrecompileError> {
        let _ = env;
        Ok(())
    }
}

impl<P: Precompile + ?Sized> Precompile for Box<P> {
    fn is_static(&self, input: &[u8]) -> bool {
        (**self).is_static(input)
    }

    fn run(&self, env: &mut Environment<'_>, input: &[u8]) -> Result<Bytes, PrecompileError> {
        (**self).run(env, input)
    }

    fn finalise(&self, env: &mut Environment<'_>) -> Result<(), PrecompileError> {
        (**self).finalise(env)
    }

    fn commit(&self, env: &mut Environment<'_>) -> Result<(), PrecompileError> {
        (**self).commit(env)
    }
}
