//! # keystone-env
//!
//! The execution environment stateful precompiles run against.
//!
//! Every primitive operation a precompile performs, from storage access to
//! block introspection and external calls, is issued as an opcode through
//! [`Environment::execute`], which consults the operation table, charges
//! gas, enforces the static/trusted/feature policies and delegates to the
//! underlying [`StateDB`](state::StateDB) and host contexts.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod caller;
pub mod context;
mod env;
pub mod envelope;
mod error;
pub mod gas;
mod instructions;
pub mod opcode;

pub use caller::{CallOutcome, Caller, CreateOutcome};
pub use context::{BlockContext, BlockEnv, CallContext, CallEnv};
pub use envelope::{decode_error_envelope, encode_error_envelope};
pub use env::{EnvConfig, EnvFlags, Environment};
pub use error::EnvError;
pub use gas::{Gas, GasSchedule};
pub use opcode::{OpCode, Operation, OPERATIONS};
