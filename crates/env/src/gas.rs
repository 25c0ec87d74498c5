//! Gas accounting for environment operations.

pub mod constants;

pub use constants::*;

/// The gas budget of one precompile invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gas {
    /// The initial gas limit. This is constant throughout execution.
    limit: u64,
    /// The remaining gas.
    remaining: u64,
}

impl Gas {
    /// Creates a new `Gas` struct with the given gas limit.
    #[inline]
    pub const fn new(limit: u64) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    /// Returns the gas limit.
    #[inline]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Returns the total amount of gas spent.
    #[inline]
    pub const fn spent(&self) -> u64 {
        self.limit - self.remaining
    }

    /// Returns the amount of gas remaining.
    #[inline]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Return remaining gas after subtracting the 1/64 retained part.
    #[inline]
    pub const fn remaining_63_of_64_parts(&self) -> u64 {
        self.remaining - self.remaining / 64
    }

    /// Erases a gas cost from the totals, crediting back unspent child gas.
    #[inline]
    pub fn erase_cost(&mut self, returned: u64) {
        self.remaining += returned;
    }

    /// Spends all remaining gas.
    #[inline]
    pub fn spend_all(&mut self) {
        self.remaining = 0;
    }

    /// Records an explicit cost.
    ///
    /// Returns `false` if the gas limit is exceeded.
    #[inline]
    #[must_use = "out of gas must surface as an error"]
    pub fn record_cost(&mut self, cost: u64) -> bool {
        if let Some(new_remaining) = self.remaining.checked_sub(cost) {
            self.remaining = new_remaining;
            return true;
        }
        false
    }
}

/// Gas policy values of the active deployment.
///
/// The environment supplies mechanism; the exact charge for storage and
/// preimage traffic is host policy. Defaults follow the Berlin-era
/// constants in [`constants`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GasSchedule {
    /// Cost of touching a cold storage slot.
    pub cold_sload_cost: u64,
    /// Cost of touching a cold account.
    pub cold_account_access_cost: u64,
    /// Cost of a warm storage or account read.
    pub warm_storage_read_cost: u64,
    /// Cost of an sstore writing a non-zero value into a zero slot.
    pub sstore_set_gas: u64,
    /// Cost of an sstore overwriting a non-zero slot.
    pub sstore_reset_gas: u64,
    /// Refund for an sstore clearing a non-zero slot.
    pub sstore_clears_refund: u64,
    /// Cost of an ephemeral load or store.
    pub ephemeral_access_cost: u64,
    /// Base cost of a keccak-256 hash.
    pub keccak_base: u64,
    /// Per-word cost of a keccak-256 hash.
    pub keccak_word: u64,
    /// Base cost of a log record.
    pub log_base: u64,
    /// Per-topic cost of a log record.
    pub log_topic: u64,
    /// Per-byte cost of log data.
    pub log_data_byte: u64,
    /// Base cost of storing a preimage.
    pub preimage_store_base: u64,
    /// Per-word cost of storing a preimage.
    pub preimage_store_word: u64,
    /// Base cost of loading a preimage.
    pub preimage_load_base: u64,
    /// Per-word cost of loading a preimage.
    pub preimage_load_word: u64,
    /// Cost of querying a preimage size.
    pub preimage_size_cost: u64,
    /// Base cost of a contract creation.
    pub create_gas: u64,
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self {
            cold_sload_cost: COLD_SLOAD_COST,
            cold_account_access_cost: COLD_ACCOUNT_ACCESS_COST,
            warm_storage_read_cost: WARM_STORAGE_READ_COST,
            sstore_set_gas: SSTORE_SET,
            sstore_reset_gas: SSTORE_RESET,
            sstore_clears_refund: REFUND_SSTORE_CLEARS,
            ephemeral_access_cost: WARM_STORAGE_READ_COST,
            keccak_base: KECCAK256,
            keccak_word: KECCAK256WORD,
            log_base: LOG,
            log_topic: LOGTOPIC,
            log_data_byte: LOGDATA,
            preimage_store_base: PREIMAGE_STORE_BASE,
            preimage_store_word: PREIMAGE_STORE_WORD,
            preimage_load_base: PREIMAGE_LOAD_BASE,
            preimage_load_word: PREIMAGE_LOAD_WORD,
            preimage_size_cost: PREIMAGE_SIZE,
            create_gas: CREATE,
        }
    }
}

impl GasSchedule {
    /// Cost of hashing `len` bytes with keccak-256.
    #[inline]
    pub const fn keccak_cost(&self, len: u64) -> u64 {
        self.keccak_base + self.keccak_word * len.div_ceil(32)
    }

    /// Cost of storing a `len`-byte preimage.
    #[inline]
    pub const fn preimage_store_cost(&self, len: u64) -> u64 {
        self.preimage_store_base + self.preimage_store_word * len.div_ceil(32)
    }

    /// Cost of loading a `len`-byte preimage.
    #[inline]
    pub const fn preimage_load_cost(&self, len: u64) -> u64 {
        self.preimage_load_base + self.preimage_load_word * len.div_ceil(32)
    }

    /// Cost of a log with `topics` topics and `data_len` bytes of payload.
    #[inline]
    pub const fn log_cost(&self, topics: u64, data_len: u64) -> u64 {
        self.log_base + self.log_topic * topics + self.log_data_byte * data_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_erase() {
        let mut gas = Gas::new(100);
        assert!(gas.record_cost(40));
        assert_eq!(gas.remaining(), 60);
        assert_eq!(gas.spent(), 40);
        gas.erase_cost(10);
        assert_eq!(gas.remaining(), 70);
    }

    #[test]
    fn record_cost_checks_budget() {
        let mut gas = Gas::new(10);
        assert!(!gas.record_cost(11));
        // A failed charge leaves the budget untouched.
        assert_eq!(gas.remaining(), 10);
    }

    #[test]
    fn child_gas_retention() {
        let gas = Gas::new(6400);
        assert_eq!(gas.remaining_63_of_64_parts(), 6300);
    }

    #[test]
    fn keccak_cost_rounds_up_to_words() {
        let schedule = GasSchedule::default();
        assert_eq!(schedule.keccak_cost(0), KECCAK256);
        assert_eq!(schedule.keccak_cost(1), KECCAK256 + KECCAK256WORD);
        assert_eq!(schedule.keccak_cost(32), KECCAK256 + KECCAK256WORD);
        assert_eq!(schedule.keccak_cost(33), KECCAK256 + 2 * KECCAK256WORD);
    }
}
