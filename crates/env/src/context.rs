//! Block and call contexts supplied by the host.

use alloc::boxed::Box;
use auto_impl::auto_impl;
use primitives::{Address, Bytes, HashMap, B256, U256};

/// Block information for the block an invocation executes in.
///
/// Values must be stable for the duration of one invocation.
#[auto_impl(&, Box)]
pub trait BlockContext {
    /// Hash of ancestor block `number`, zero when unavailable.
    fn block_hash(&self, number: u64) -> B256;

    /// Gas limit of the block.
    fn gas_limit(&self) -> u64;

    /// Height of the block.
    fn block_number(&self) -> u64;

    /// Timestamp of the block in seconds since the UNIX epoch.
    fn timestamp(&self) -> u64;

    /// Difficulty of the block; unused by post-merge hosts.
    fn difficulty(&self) -> U256;

    /// Base fee per gas.
    fn base_fee(&self) -> U256;

    /// Beneficiary address of the block.
    fn coinbase(&self) -> Address;

    /// Output of the randomness beacon.
    fn random(&self) -> B256;
}

/// Transaction and call-frame information for the current invocation.
#[auto_impl(&, Box)]
pub trait CallContext {
    /// Effective gas price of the transaction.
    fn tx_gas_price(&self) -> U256;

    /// Sender of the transaction.
    fn tx_origin(&self) -> Address;

    /// Input data of the call, copied before exposure.
    fn call_data(&self) -> Bytes;

    /// Length of the input data in bytes.
    fn call_data_size(&self) -> u64;

    /// Immediate caller of the precompile.
    fn caller(&self) -> Address;

    /// Value transferred with the call.
    fn call_value(&self) -> U256;
}

/// A plain-data [`BlockContext`] for hosts and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockEnv {
    /// Height of the block.
    pub number: u64,
    /// Beneficiary address.
    pub coinbase: Address,
    /// Timestamp in seconds.
    pub timestamp: u64,
    /// Gas limit of the block.
    pub gas_limit: u64,
    /// Difficulty of the block.
    pub difficulty: U256,
    /// Base fee per gas.
    pub base_fee: U256,
    /// Randomness beacon output.
    pub random: B256,
    /// Ancestor hashes by height.
    pub hashes: HashMap<u64, B256>,
}

impl BlockContext for BlockEnv {
    fn block_hash(&self, number: u64) -> B256 {
        self.hashes.get(&number).copied().unwrap_or_default()
    }

    fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    fn block_number(&self) -> u64 {
        self.number
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn difficulty(&self) -> U256 {
        self.difficulty
    }

    fn base_fee(&self) -> U256 {
        self.base_fee
    }

    fn coinbase(&self) -> Address {
        self.coinbase
    }

    fn random(&self) -> B256 {
        self.random
    }
}

/// A plain-data [`CallContext`] for hosts and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallEnv {
    /// Effective gas price.
    pub gas_price: U256,
    /// Transaction origin.
    pub origin: Address,
    /// Call input data.
    pub data: Bytes,
    /// Immediate caller.
    pub caller: Address,
    /// Transferred value.
    pub value: U256,
}

impl CallContext for CallEnv {
    fn tx_gas_price(&self) -> U256 {
        self.gas_price
    }

    fn tx_origin(&self) -> Address {
        self.origin
    }

    fn call_data(&self) -> Bytes {
        self.data.clone()
    }

    fn call_data_size(&self) -> u64 {
        self.data.len() as u64
    }

    fn caller(&self) -> Address {
        self.caller
    }

    fn call_value(&self) -> U256 {
        self.value
    }
}
