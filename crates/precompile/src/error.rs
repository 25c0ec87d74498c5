use alloc::string::{String, ToString};
use core::fmt;
use datastore::StoreError;
use env::EnvError;
use primitives::CodecError;

/// Failure of a precompile `run`.
///
/// The host wrapper converts any of these into a revert whose return bytes
/// are the display message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrecompileError {
    /// The input does not decode against the precompile's ABI.
    InvalidInput(String),
    /// The input selector does not name a method of this precompile.
    UnknownSelector,
    /// Explicit revert with a message.
    Revert(String),
    /// The environment failed; carries the sticky error.
    Env(EnvError),
    /// A structured-store operation failed.
    Store(StoreError),
}

impl PrecompileError {
    /// An explicit revert with the given message.
    pub fn revert(message: impl Into<String>) -> Self {
        Self::Revert(message.into())
    }
}

impl fmt::Display for PrecompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::UnknownSelector => f.write_str("unknown method selector"),
            Self::Revert(msg) => f.write_str(msg),
            Self::Env(err) => err.fmt(f),
            Self::Store(err) => err.fmt(f),
        }
    }
}

impl From<EnvError> for PrecompileError {
    fn from(err: EnvError) -> Self {
        Self::Env(err)
    }
}

impl From<StoreError> for PrecompileError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<CodecError> for PrecompileError {
    fn from(err: CodecError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<alloy_sol_types::Error> for PrecompileError {
    fn from(err: alloy_sol_types::Error) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl core::error::Error for PrecompileError {}
