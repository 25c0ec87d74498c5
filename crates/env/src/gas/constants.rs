//! Default gas constants.
//!
//! These seed [`GasSchedule::default`](super::GasSchedule::default); hosts
//! with a different policy substitute their own schedule.

/// Gas cost for operations that consume zero gas.
pub const ZERO: u64 = 0;
/// Base gas cost for context reads.
pub const BASE: u64 = 2;
/// Gas cost for very low-cost operations.
pub const VERYLOW: u64 = 3;

/// Base gas cost for keccak-256 hashing.
pub const KECCAK256: u64 = 30;
/// Gas cost per word for keccak-256 hashing.
pub const KECCAK256WORD: u64 = 6;

/// Base gas cost for a log record.
pub const LOG: u64 = 375;
/// Gas cost per byte of data in a log record.
pub const LOGDATA: u64 = 8;
/// Gas cost per topic in a log record.
pub const LOGTOPIC: u64 = 375;

/// Gas cost for reading the hash of a recent block.
pub const BLOCKHASH: u64 = 20;

/// Gas cost for a contract creation.
pub const CREATE: u64 = 32000;

/// Gas cost for SSTORE when setting a storage slot from zero to non-zero.
pub const SSTORE_SET: u64 = 20000;
/// Gas cost for SSTORE when modifying an existing non-zero storage slot.
pub const SSTORE_RESET: u64 = 5000;
/// Gas refund for SSTORE when clearing a storage slot.
pub const REFUND_SSTORE_CLEARS: u64 = 15000;

/// Gas cost for SLOAD when accessing a cold storage slot (EIP-2929).
pub const COLD_SLOAD_COST: u64 = 2100;
/// Gas cost for accessing a cold account (EIP-2929).
pub const COLD_ACCOUNT_ACCESS_COST: u64 = 2600;
/// Gas cost for reading from a warm storage slot (EIP-2929).
pub const WARM_STORAGE_READ_COST: u64 = 100;

/// Base gas cost for registering a preimage.
pub const PREIMAGE_STORE_BASE: u64 = 375;
/// Gas cost per word of a registered preimage.
pub const PREIMAGE_STORE_WORD: u64 = 8;
/// Base gas cost for loading a preimage.
pub const PREIMAGE_LOAD_BASE: u64 = 100;
/// Gas cost per word of a loaded preimage.
pub const PREIMAGE_LOAD_WORD: u64 = 3;
/// Gas cost for querying a preimage size.
pub const PREIMAGE_SIZE: u64 = 100;
