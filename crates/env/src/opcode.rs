//! The operation table.
//!
//! Every primitive the environment offers is an opcode byte mapped to an
//! [`Operation`]: an executor plus the metadata dispatch needs (constant
//! gas, an optional dynamic-gas function, the static and trusted flags,
//! the declared input signature). The table is total: bytes without an
//! assigned operation dispatch to [`EnvError::InvalidOpCode`].

use crate::{
    error::EnvError,
    gas,
    instructions::{block_info, external, meta, preimage, storage, system, tx_info},
    Environment,
};
use alloc::vec::Vec;
use core::fmt;
use primitives::Bytes;

/// Result of one executed operation: the encoded return values.
pub type OpResult = Result<Vec<Bytes>, EnvError>;

/// Executor function of an operation.
pub type OperationFn = fn(&mut Environment<'_>, &[Bytes]) -> OpResult;

/// Dynamic-gas function of an operation.
///
/// Evaluated after constant gas is charged and before the executor runs;
/// may consult and mutate the access list (warming is part of pricing).
pub type DynamicGasFn = fn(&mut Environment<'_>, &[Bytes]) -> Result<u64, EnvError>;

/// Declared input signature of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSpec {
    /// Fixed argument list; `Some(n)` pins the width of the argument in
    /// bytes, `None` admits any length.
    Args(&'static [Option<usize>]),
    /// Log signature: up to four 32-byte topics followed by one data
    /// argument of any length.
    Log,
}

impl InputSpec {
    pub(crate) fn validate(&self, args: &[Bytes]) -> Result<(), EnvError> {
        match self {
            Self::Args(widths) => {
                if args.len() != widths.len() {
                    return Err(EnvError::InvalidInput);
                }
                for (arg, width) in args.iter().zip(widths.iter()) {
                    if let Some(width) = width {
                        if arg.len() != *width {
                            return Err(EnvError::InvalidInput);
                        }
                    }
                }
                Ok(())
            }
            Self::Log => {
                let Some((_, topics)) = args.split_last() else {
                    return Err(EnvError::InvalidInput);
                };
                if topics.len() > 4 || topics.iter().any(|t| t.len() != 32) {
                    return Err(EnvError::InvalidInput);
                }
                Ok(())
            }
        }
    }
}

const NO_ARGS: InputSpec = InputSpec::Args(&[]);
const BOOL_ARG: InputSpec = InputSpec::Args(&[Some(1)]);
const DATA_ARG: InputSpec = InputSpec::Args(&[None]);
const WORD_ARG: InputSpec = InputSpec::Args(&[Some(32)]);
const U64_ARG: InputSpec = InputSpec::Args(&[Some(8)]);
const ADDRESS_ARG: InputSpec = InputSpec::Args(&[Some(20)]);
const WORD_WORD_ARGS: InputSpec = InputSpec::Args(&[Some(32), Some(32)]);
const CALL_ARGS: InputSpec = InputSpec::Args(&[Some(20), None, Some(8), Some(32)]);
const STATIC_CALL_ARGS: InputSpec = InputSpec::Args(&[Some(20), None, Some(8)]);
const CREATE_ARGS: InputSpec = InputSpec::Args(&[None, Some(32)]);
const CREATE2_ARGS: InputSpec = InputSpec::Args(&[None, Some(32), Some(32)]);

/// One entry of the operation table.
#[derive(Clone, Copy)]
pub struct Operation {
    name: &'static str,
    execute: OperationFn,
    constant_gas: u64,
    dynamic_gas: Option<DynamicGasFn>,
    static_allowed: bool,
    trusted: bool,
    inputs: InputSpec,
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("constant_gas", &self.constant_gas)
            .field("dynamic_gas", &self.dynamic_gas.is_some())
            .field("static_allowed", &self.static_allowed)
            .field("trusted", &self.trusted)
            .field("inputs", &self.inputs)
            .finish()
    }
}

impl Operation {
    /// Creates a non-static, untrusted, zero-gas operation.
    pub const fn new(name: &'static str, execute: OperationFn) -> Self {
        Self {
            name,
            execute,
            constant_gas: 0,
            dynamic_gas: None,
            static_allowed: false,
            trusted: false,
            inputs: NO_ARGS,
        }
    }

    /// Operation name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Executor function.
    #[inline]
    pub const fn executor(&self) -> OperationFn {
        self.execute
    }

    /// Gas charged unconditionally when metering is on.
    #[inline]
    pub const fn constant_gas(&self) -> u64 {
        self.constant_gas
    }

    /// Dynamic-gas function, if the operation has one.
    #[inline]
    pub const fn dynamic_gas(&self) -> Option<DynamicGasFn> {
        self.dynamic_gas
    }

    /// Whether the operation is permitted under a static call.
    #[inline]
    pub const fn is_static(&self) -> bool {
        self.static_allowed
    }

    /// Whether the operation requires a trusted environment.
    #[inline]
    pub const fn is_trusted(&self) -> bool {
        self.trusted
    }

    /// Declared input signature.
    #[inline]
    pub const fn inputs(&self) -> InputSpec {
        self.inputs
    }
}

/// Sets the constant gas of an [`Operation`]; used in [`OPERATIONS`].
pub const fn constant_gas(mut op: Operation, gas: u64) -> Operation {
    op.constant_gas = gas;
    op
}

/// Sets the dynamic-gas function of an [`Operation`]; used in [`OPERATIONS`].
pub const fn dynamic_gas(mut op: Operation, f: DynamicGasFn) -> Operation {
    op.dynamic_gas = Some(f);
    op
}

/// Permits the [`Operation`] under static calls; used in [`OPERATIONS`].
pub const fn static_op(mut op: Operation) -> Operation {
    op.static_allowed = true;
    op
}

/// Restricts the [`Operation`] to trusted environments; used in [`OPERATIONS`].
pub const fn trusted(mut op: Operation) -> Operation {
    op.trusted = true;
    op
}

/// Sets the input signature of an [`Operation`]; used in [`OPERATIONS`].
pub const fn inputs(mut op: Operation, spec: InputSpec) -> Operation {
    op.inputs = spec;
    op
}

/// An opcode byte wrapped with table-aware accessors.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpCode(u8);

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation() {
            Some(op) => f.write_str(op.name()),
            None => write!(f, "UNKNOWN({:#04x})", self.0),
        }
    }
}

impl fmt::Debug for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpCode::{self}")
    }
}

impl OpCode {
    /// Instantiates a new opcode from a byte with an assigned operation.
    #[inline]
    pub const fn new(opcode: u8) -> Option<Self> {
        match OPERATIONS[opcode as usize] {
            Some(_) => Some(Self(opcode)),
            None => None,
        }
    }

    /// Instantiates an opcode without checking the table.
    ///
    /// Dispatching an unassigned byte yields
    /// [`EnvError::InvalidOpCode`](crate::EnvError::InvalidOpCode).
    #[inline]
    pub const fn new_unchecked(opcode: u8) -> Self {
        Self(opcode)
    }

    /// Returns the opcode byte.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns the operation assigned to this opcode.
    #[inline]
    pub fn operation(self) -> Option<&'static Operation> {
        OPERATIONS[self.0 as usize].as_ref()
    }
}

impl PartialEq<u8> for OpCode {
    fn eq(&self, other: &u8) -> bool {
        self.get().eq(other)
    }
}

/// Creates the opcode constants and the total [`OPERATIONS`] table.
macro_rules! operations {
    ($($val:literal => $name:ident => $execute:path $(, $modifier:ident $(( $($modifier_arg:expr),* ))?)*);* $(;)?) => {
        // Constants for each opcode byte.
        $(
            #[doc = concat!("The `", stringify!($val), "` (\"", stringify!($name), "\") opcode.")]
            pub const $name: u8 = $val;
        )*
        impl OpCode {$(
            #[doc = concat!("The `", stringify!($val), "` (\"", stringify!($name), "\") opcode.")]
            pub const $name: Self = Self($val);
        )*}

        /// Maps each opcode byte to its operation.
        pub static OPERATIONS: [Option<Operation>; 256] = {
            let mut table: [Option<Operation>; 256] = [None; 256];
            let mut prev: u8 = 0;
            $(
                let val: u8 = $val;
                assert!(val == 0 || val > prev, "opcodes must be sorted in ascending order");
                prev = val;
                let entry = Operation::new(stringify!($name), $execute);
                $(
                    let entry = $modifier(entry $(, $($modifier_arg),*)?);
                )*
                table[$val as usize] = Some(entry);
            )*
            let _ = prev;
            table
        };
    };
}

// When adding new operations:
// 1. add the opcode to the list below, sorted by byte value;
// 2. implement the executor in the matching `instructions` module;
// 3. route any schedule-dependent pricing through a dynamic-gas function.
operations! {
    0x01 => METERING   => meta::metering, inputs(BOOL_ARG), trusted, static_op;
    0x02 => DEBUG      => meta::debug, inputs(DATA_ARG), trusted, static_op;
    0x03 => TIMENOW    => meta::time_now, trusted, static_op;

    0x20 => KECCAK256  => system::keccak, inputs(DATA_ARG), dynamic_gas(system::keccak_gas), static_op;

    0x30 => ADDRESS       => system::address, constant_gas(gas::BASE), static_op;
    0x31 => EXTBALANCE    => external::ext_balance, inputs(ADDRESS_ARG), dynamic_gas(external::account_access_gas), static_op;
    0x32 => ORIGIN        => tx_info::origin, constant_gas(gas::BASE), static_op;
    0x33 => CALLER        => tx_info::caller, constant_gas(gas::BASE), static_op;
    0x34 => CALLVALUE     => tx_info::call_value, constant_gas(gas::BASE), static_op;
    0x35 => CALLDATA      => tx_info::call_data, constant_gas(gas::BASE), static_op;
    0x36 => CALLDATASIZE  => tx_info::call_data_size, constant_gas(gas::BASE), static_op;
    0x38 => CODESIZE      => system::code_size, constant_gas(gas::BASE), static_op;
    0x39 => CODE          => system::code, constant_gas(gas::BASE), static_op;
    0x3A => GASPRICE      => tx_info::gas_price, constant_gas(gas::BASE), static_op;
    0x3B => EXTCODESIZE   => external::ext_code_size, inputs(ADDRESS_ARG), dynamic_gas(external::account_access_gas), static_op;
    0x3C => EXTCODE       => external::ext_code, inputs(ADDRESS_ARG), dynamic_gas(external::account_access_gas), static_op;
    0x3F => EXTCODEHASH   => external::ext_code_hash, inputs(ADDRESS_ARG), dynamic_gas(external::account_access_gas), static_op;

    0x40 => BLOCKHASH   => block_info::block_hash, inputs(U64_ARG), constant_gas(gas::BLOCKHASH), static_op;
    0x41 => COINBASE    => block_info::coinbase, constant_gas(gas::BASE), static_op;
    0x42 => TIMESTAMP   => block_info::timestamp, constant_gas(gas::BASE), static_op;
    0x43 => NUMBER      => block_info::block_number, constant_gas(gas::BASE), static_op;
    0x44 => DIFFICULTY  => block_info::difficulty, constant_gas(gas::BASE), static_op;
    0x45 => GASLIMIT    => block_info::gas_limit, constant_gas(gas::BASE), static_op;
    0x47 => SELFBALANCE => system::self_balance, constant_gas(gas::VERYLOW), static_op;
    0x48 => BASEFEE     => block_info::base_fee, constant_gas(gas::BASE), static_op;
    0x4C => PREVRANDAO  => block_info::prevrandao, constant_gas(gas::BASE), static_op;

    0x50 => USEGAS  => system::use_gas, inputs(U64_ARG), dynamic_gas(system::use_gas_amount), static_op;
    0x54 => SLOAD   => storage::sload, inputs(WORD_ARG), dynamic_gas(storage::sload_gas), static_op;
    0x55 => SSTORE  => storage::sstore, inputs(WORD_WORD_ARGS), dynamic_gas(storage::sstore_gas);
    0x5A => GASLEFT => system::gas_left, constant_gas(gas::BASE), static_op;
    0x5C => TLOAD   => storage::tload, inputs(WORD_ARG), dynamic_gas(storage::ephemeral_gas), trusted, static_op;
    0x5D => TSTORE  => storage::tstore, inputs(WORD_WORD_ARGS), dynamic_gas(storage::ephemeral_gas), trusted;

    0x60 => PREIMAGESTORE  => preimage::store, inputs(DATA_ARG), dynamic_gas(preimage::store_gas);
    0x61 => PREIMAGELOAD   => preimage::load, inputs(WORD_ARG), dynamic_gas(preimage::load_gas), static_op;
    0x62 => PREIMAGESIZE   => preimage::size, inputs(WORD_ARG), dynamic_gas(preimage::size_gas), static_op;
    0x63 => EPREIMAGESTORE => preimage::ephemeral_store, inputs(DATA_ARG), dynamic_gas(preimage::store_gas), trusted;
    0x64 => EPREIMAGELOAD  => preimage::ephemeral_load, inputs(WORD_ARG), dynamic_gas(preimage::ephemeral_load_gas), trusted, static_op;
    0x65 => EPREIMAGESIZE  => preimage::ephemeral_size, inputs(WORD_ARG), dynamic_gas(preimage::size_gas), trusted, static_op;

    0xA0 => LOG => system::log, inputs(InputSpec::Log), dynamic_gas(system::log_gas);

    0xF0 => CREATE       => external::create, inputs(CREATE_ARGS), dynamic_gas(external::create_gas);
    0xF1 => CALL         => external::call, inputs(CALL_ARGS), dynamic_gas(external::account_access_gas);
    0xF4 => CALLDELEGATE => external::call_delegate, inputs(STATIC_CALL_ARGS), dynamic_gas(external::account_access_gas);
    0xF5 => CREATE2      => external::create2, inputs(CREATE2_ARGS), dynamic_gas(external::create2_gas);
    0xFA => CALLSTATIC   => external::call_static, inputs(STATIC_CALL_ARGS), dynamic_gas(external::account_access_gas), static_op;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_total_over_assigned_bytes() {
        for byte in 0u16..=255 {
            let opcode = OpCode::new_unchecked(byte as u8);
            if let Some(op) = opcode.operation() {
                assert!(!op.name().is_empty());
                assert_eq!(OpCode::new(byte as u8), Some(opcode));
            } else {
                assert_eq!(OpCode::new(byte as u8), None);
            }
        }
    }

    #[test]
    fn trusted_ops_cover_ephemeral_io_debug_and_time() {
        for byte in [METERING, DEBUG, TIMENOW, TLOAD, TSTORE, EPREIMAGESTORE, EPREIMAGELOAD, EPREIMAGESIZE] {
            let op = OpCode::new(byte).unwrap().operation().unwrap();
            assert!(op.is_trusted(), "{} must be trusted", op.name());
        }
        let sload = OpCode::SLOAD.operation().unwrap();
        assert!(!sload.is_trusted());
    }

    #[test]
    fn writes_are_not_static() {
        for byte in [SSTORE, TSTORE, LOG, PREIMAGESTORE, EPREIMAGESTORE, CALL, CALLDELEGATE, CREATE, CREATE2] {
            let op = OpCode::new(byte).unwrap().operation().unwrap();
            assert!(!op.is_static(), "{} must not be static", op.name());
        }
        assert!(OpCode::CALLSTATIC.operation().unwrap().is_static());
        assert!(OpCode::SLOAD.operation().unwrap().is_static());
    }

    #[test]
    fn log_signature() {
        let spec = InputSpec::Log;
        let data = Bytes::from_static(b"payload");
        let topic = Bytes::copy_from_slice(&[0u8; 32]);
        assert!(spec.validate(&[data.clone()]).is_ok());
        assert!(spec
            .validate(&[topic.clone(), topic.clone(), data.clone()])
            .is_ok());
        // Five topics is one too many.
        let five = [
            topic.clone(),
            topic.clone(),
            topic.clone(),
            topic.clone(),
            topic.clone(),
            data.clone(),
        ];
        assert_eq!(spec.validate(&five), Err(EnvError::InvalidInput));
        // Topics must be words.
        assert_eq!(
            spec.validate(&[Bytes::from_static(b"short"), data]),
            Err(EnvError::InvalidInput)
        );
        assert_eq!(spec.validate(&[]), Err(EnvError::InvalidInput));
    }

    #[test]
    fn fixed_signatures_pin_widths() {
        let spec = WORD_WORD_ARGS;
        let word = Bytes::copy_from_slice(&[0u8; 32]);
        assert!(spec.validate(&[word.clone(), word.clone()]).is_ok());
        assert_eq!(spec.validate(&[word.clone()]), Err(EnvError::InvalidInput));
        assert_eq!(
            spec.validate(&[word, Bytes::from_static(b"x")]),
            Err(EnvError::InvalidInput)
        );
    }

    #[test]
    fn display_names() {
        assert_eq!(alloc::format!("{}", OpCode::SLOAD), "SLOAD");
        assert_eq!(
            alloc::format!("{}", OpCode::new_unchecked(0xFE)),
            "UNKNOWN(0xfe)"
        );
    }
}
