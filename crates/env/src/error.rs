use core::fmt;

/// Failure classes of an [`Environment`](crate::Environment) invocation.
///
/// The first error an invocation hits is sticky: it is stored on the
/// environment and every subsequent opcode short-circuits with it. None of
/// these are caught inside the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvError {
    /// A trusted-only opcode was issued from an untrusted environment.
    NotTrusted,
    /// A writing opcode was issued under a static call.
    WriteProtection,
    /// The gas budget cannot cover the opcode's cost.
    OutOfGas,
    /// The opcode depends on a feature the configuration disables.
    FeatureDisabled,
    /// The opcode byte has no operation assigned.
    InvalidOpCode(u8),
    /// Argument arity or width does not match the opcode's signature.
    InvalidInput,
    /// A required context (block, call, caller) was not provided.
    NoData,
    /// Execution was explicitly reverted.
    ExecutionReverted,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotTrusted => f.write_str("environment is not trusted"),
            Self::WriteProtection => f.write_str("write protection"),
            Self::OutOfGas => f.write_str("out of gas"),
            Self::FeatureDisabled => f.write_str("feature disabled"),
            Self::InvalidOpCode(op) => write!(f, "invalid opcode: {op:#04x}"),
            Self::InvalidInput => f.write_str("invalid input"),
            Self::NoData => f.write_str("no data"),
            Self::ExecutionReverted => f.write_str("execution reverted"),
        }
    }
}

impl core::error::Error for EnvError {}
