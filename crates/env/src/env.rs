use crate::{
    caller::Caller,
    context::{BlockContext, CallContext},
    envelope::decode_error_envelope,
    error::EnvError,
    gas::{Gas, GasSchedule},
    opcode::OpCode,
};
use alloc::{string::String, vec::Vec};
use bitflags::bitflags;
use primitives::{Address, Bytes, Codec, B256, U256};
use state::StateDB;

bitflags! {
    /// Configuration flags of one environment.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct EnvFlags: u8 {
        /// The invocation runs under a static call; writing operations are
        /// rejected with write protection.
        const STATIC = 1 << 0;
        /// The precompile is trusted; privileged operations are permitted.
        const TRUSTED = 1 << 1;
        /// Ephemeral storage and ephemeral preimages are available.
        const EPHEMERAL = 1 << 2;
        /// Preimage registries are available.
        const PREIMAGES = 1 << 3;
    }
}

/// Configuration of one precompile invocation.
#[derive(Clone, Copy, Debug)]
pub struct EnvConfig {
    /// Address the precompile executes as.
    pub address: Address,
    /// Policy flags.
    pub flags: EnvFlags,
    /// Gas budget of the invocation.
    pub gas_limit: u64,
    /// Gas policy values of the deployment.
    pub schedule: GasSchedule,
}

impl EnvConfig {
    /// Creates a config with the default schedule and no flags set.
    pub fn new(address: Address, gas_limit: u64) -> Self {
        Self {
            address,
            flags: EnvFlags::empty(),
            gas_limit,
            schedule: GasSchedule::default(),
        }
    }

    /// Adds flags to the config.
    pub fn with_flags(mut self, flags: EnvFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Replaces the gas schedule.
    pub fn with_schedule(mut self, schedule: GasSchedule) -> Self {
        self.schedule = schedule;
        self
    }
}

/// The execution environment of one precompile invocation.
///
/// Exclusively borrows the [`StateDB`] for the duration of the invocation
/// and carries the block, call and caller handles the host provided. Every
/// primitive operation goes through [`Environment::execute`]; the typed
/// methods below are thin wrappers that encode arguments, dispatch and
/// decode results.
///
/// The environment is a two-state machine: `Ready` until the first error,
/// `Terminal` after it. There is no reset; hosts construct a fresh
/// environment per invocation.
pub struct Environment<'a> {
    address: Address,
    flags: EnvFlags,
    schedule: GasSchedule,
    gas: Gas,
    metering: bool,
    error: Option<EnvError>,
    statedb: &'a mut dyn StateDB,
    block: Option<&'a dyn BlockContext>,
    call_ctx: Option<&'a dyn CallContext>,
    caller: Option<&'a mut dyn Caller>,
    debug_log: Vec<String>,
}

impl core::fmt::Debug for Environment<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Environment")
            .field("address", &self.address)
            .field("flags", &self.flags)
            .field("gas", &self.gas)
            .field("metering", &self.metering)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<'a> Environment<'a> {
    /// Creates an environment over `statedb` without block, call or caller
    /// contexts; operations needing one fail with [`EnvError::NoData`].
    pub fn new(config: EnvConfig, statedb: &'a mut dyn StateDB) -> Self {
        Self {
            address: config.address,
            flags: config.flags,
            schedule: config.schedule,
            gas: Gas::new(config.gas_limit),
            metering: true,
            error: None,
            statedb,
            block: None,
            call_ctx: None,
            caller: None,
            debug_log: Vec::new(),
        }
    }

    /// Attaches a block context.
    pub fn with_block_context(mut self, block: &'a dyn BlockContext) -> Self {
        self.block = Some(block);
        self
    }

    /// Attaches a call context.
    pub fn with_call_context(mut self, call_ctx: &'a dyn CallContext) -> Self {
        self.call_ctx = Some(call_ctx);
        self
    }

    /// Attaches a caller for the call/create family.
    pub fn with_caller(mut self, caller: &'a mut dyn Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Address the precompile executes as.
    #[inline]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Configuration flags.
    #[inline]
    pub fn flags(&self) -> EnvFlags {
        self.flags
    }

    /// Gas policy values.
    #[inline]
    pub fn schedule(&self) -> &GasSchedule {
        &self.schedule
    }

    /// Gas budget state.
    #[inline]
    pub fn gas(&self) -> &Gas {
        &self.gas
    }

    /// The sticky error, if the environment is terminal.
    #[inline]
    pub fn error(&self) -> Option<&EnvError> {
        self.error.as_ref()
    }

    /// The state this invocation mutates.
    #[inline]
    pub fn statedb(&mut self) -> &mut dyn StateDB {
        self.statedb
    }

    /// Debug messages recorded so far, draining the buffer.
    pub fn take_debug_messages(&mut self) -> Vec<String> {
        core::mem::take(&mut self.debug_log)
    }

    /// Spends the entire remaining budget.
    ///
    /// Host wrappers call this when an invocation dies fatally and the
    /// whole gas allowance is forfeit.
    pub fn spend_all_gas(&mut self) {
        self.gas.spend_all();
    }

    /// Executes one operation, enforcing the dispatch policy.
    ///
    /// Once an invocation has failed, every further call returns the same
    /// error without touching gas or state.
    pub fn execute(&mut self, opcode: OpCode, args: &[Bytes]) -> Result<Vec<Bytes>, EnvError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        match self.dispatch(opcode, args) {
            Ok(outputs) => Ok(outputs),
            Err(err) => {
                if err == EnvError::OutOfGas {
                    self.gas.spend_all();
                }
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn dispatch(&mut self, opcode: OpCode, args: &[Bytes]) -> Result<Vec<Bytes>, EnvError> {
        let Some(op) = opcode.operation() else {
            return Err(EnvError::InvalidOpCode(opcode.get()));
        };
        if op.is_trusted() && !self.flags.contains(EnvFlags::TRUSTED) {
            return Err(EnvError::NotTrusted);
        }
        if self.flags.contains(EnvFlags::STATIC) && !op.is_static() {
            return Err(EnvError::WriteProtection);
        }
        if self.metering {
            self.charge(op.constant_gas())?;
            if let Some(dynamic) = op.dynamic_gas() {
                let cost = dynamic(self, args)?;
                self.charge(cost)?;
            }
        }
        op.inputs().validate(args)?;
        (op.executor())(self, args)
    }

    fn charge(&mut self, cost: u64) -> Result<(), EnvError> {
        if self.gas.record_cost(cost) {
            Ok(())
        } else {
            Err(EnvError::OutOfGas)
        }
    }

    // Accessors for executors.

    pub(crate) fn set_metering(&mut self, on: bool) {
        self.metering = on;
    }

    pub(crate) fn push_debug_message(&mut self, message: String) {
        self.debug_log.push(message);
    }

    pub(crate) fn block(&self) -> Result<&dyn BlockContext, EnvError> {
        self.block.ok_or(EnvError::NoData)
    }

    pub(crate) fn call_context(&self) -> Result<&dyn CallContext, EnvError> {
        self.call_ctx.ok_or(EnvError::NoData)
    }

    pub(crate) fn caller(&mut self) -> Result<&mut dyn Caller, EnvError> {
        match &mut self.caller {
            Some(caller) => Ok(&mut **caller),
            None => Err(EnvError::NoData),
        }
    }

    pub(crate) fn require_ephemeral(&self) -> Result<(), EnvError> {
        if self.flags.contains(EnvFlags::EPHEMERAL) {
            Ok(())
        } else {
            Err(EnvError::FeatureDisabled)
        }
    }

    pub(crate) fn require_preimages(&self) -> Result<(), EnvError> {
        if self.flags.contains(EnvFlags::PREIMAGES) {
            Ok(())
        } else {
            Err(EnvError::FeatureDisabled)
        }
    }

    /// Whether `(self.address, key)` is warm, warming it if not.
    pub(crate) fn slot_is_warm(&mut self, key: B256) -> bool {
        if self.statedb.slot_in_access_list(self.address, key) {
            return true;
        }
        self.statedb.add_slot_to_access_list(self.address, key);
        false
    }

    /// Access-list coupled cost of touching `(self.address, key)`.
    pub(crate) fn slot_access_cost(&mut self, key: B256) -> u64 {
        if self.slot_is_warm(key) {
            self.schedule.warm_storage_read_cost
        } else {
            self.schedule.cold_sload_cost
        }
    }

    /// Access-list coupled cost of touching an external account.
    pub(crate) fn account_access_cost(&mut self, address: Address) -> u64 {
        if self.statedb.address_in_access_list(address) {
            self.schedule.warm_storage_read_cost
        } else {
            self.statedb.add_address_to_access_list(address);
            self.schedule.cold_account_access_cost
        }
    }

    /// Reserves gas for a child frame: at most 63/64 of the remaining
    /// budget, capped by the requested amount, charged up front.
    pub(crate) fn reserve_child_gas(&mut self, requested: u64) -> Result<u64, EnvError> {
        if !self.metering {
            return Ok(requested.min(self.gas.remaining()));
        }
        let given = requested.min(self.gas.remaining_63_of_64_parts());
        self.charge(given)?;
        Ok(given)
    }

    /// Credits back the gas a child frame reported as unspent.
    pub(crate) fn credit_child_gas(&mut self, returned: u64) {
        if self.metering {
            self.gas.erase_cost(returned);
        }
    }
}

// Typed operation wrappers. Each encodes its arguments, dispatches through
// the table and decodes the declared outputs.
impl Environment<'_> {
    fn expect_one(mut outputs: Vec<Bytes>) -> Result<Bytes, EnvError> {
        if outputs.len() != 1 {
            return Err(EnvError::InvalidInput);
        }
        Ok(outputs.swap_remove(0))
    }

    fn one<T: Codec>(&mut self, opcode: OpCode, args: &[Bytes]) -> Result<T, EnvError> {
        let output = Self::expect_one(self.execute(opcode, args)?)?;
        T::decode(&output).map_err(|_| EnvError::InvalidInput)
    }

    fn none(&mut self, opcode: OpCode, args: &[Bytes]) -> Result<(), EnvError> {
        self.execute(opcode, args)?;
        Ok(())
    }

    /// Toggles gas metering. Trusted.
    pub fn enable_gas_metering(&mut self, on: bool) -> Result<(), EnvError> {
        self.none(OpCode::METERING, &[on.encode()])
    }

    /// Records a debug message for the host. Trusted.
    pub fn debug(&mut self, message: &str) -> Result<(), EnvError> {
        self.none(OpCode::DEBUG, &[Bytes::copy_from_slice(message.as_bytes())])
    }

    /// Wall-clock seconds since the UNIX epoch. Trusted.
    pub fn time_now(&mut self) -> Result<u64, EnvError> {
        self.one(OpCode::TIMENOW, &[])
    }

    /// Keccak-256 hash of `data`.
    pub fn keccak(&mut self, data: &[u8]) -> Result<B256, EnvError> {
        self.one(OpCode::KECCAK256, &[Bytes::copy_from_slice(data)])
    }

    /// Reads a persistent storage slot of the own address.
    pub fn storage_load(&mut self, key: B256) -> Result<B256, EnvError> {
        self.one(OpCode::SLOAD, &[key.encode()])
    }

    /// Writes a persistent storage slot of the own address.
    pub fn storage_store(&mut self, key: B256, value: B256) -> Result<(), EnvError> {
        self.none(OpCode::SSTORE, &[key.encode(), value.encode()])
    }

    /// Reads an ephemeral storage slot of the own address. Trusted.
    pub fn ephemeral_load(&mut self, key: B256) -> Result<B256, EnvError> {
        self.one(OpCode::TLOAD, &[key.encode()])
    }

    /// Writes an ephemeral storage slot of the own address. Trusted.
    pub fn ephemeral_store(&mut self, key: B256, value: B256) -> Result<(), EnvError> {
        self.none(OpCode::TSTORE, &[key.encode(), value.encode()])
    }

    /// Registers a persistent preimage, returning its content hash.
    pub fn add_preimage(&mut self, preimage: &[u8]) -> Result<B256, EnvError> {
        self.one(OpCode::PREIMAGESTORE, &[Bytes::copy_from_slice(preimage)])
    }

    /// Loads a persistent preimage, empty if absent.
    pub fn get_preimage(&mut self, hash: B256) -> Result<Bytes, EnvError> {
        Self::expect_one(self.execute(OpCode::PREIMAGELOAD, &[hash.encode()])?)
    }

    /// Size of a persistent preimage in bytes, zero if absent.
    pub fn preimage_size(&mut self, hash: B256) -> Result<u64, EnvError> {
        self.one(OpCode::PREIMAGESIZE, &[hash.encode()])
    }

    /// Registers an ephemeral preimage, returning its content hash. Trusted.
    pub fn add_ephemeral_preimage(&mut self, preimage: &[u8]) -> Result<B256, EnvError> {
        self.one(OpCode::EPREIMAGESTORE, &[Bytes::copy_from_slice(preimage)])
    }

    /// Loads an ephemeral preimage, empty if absent. Trusted.
    pub fn get_ephemeral_preimage(&mut self, hash: B256) -> Result<Bytes, EnvError> {
        Self::expect_one(self.execute(OpCode::EPREIMAGELOAD, &[hash.encode()])?)
    }

    /// Size of an ephemeral preimage in bytes, zero if absent. Trusted.
    pub fn ephemeral_preimage_size(&mut self, hash: B256) -> Result<u64, EnvError> {
        self.one(OpCode::EPREIMAGESIZE, &[hash.encode()])
    }

    /// Own address, read through the table.
    pub fn self_address(&mut self) -> Result<Address, EnvError> {
        self.one(OpCode::ADDRESS, &[])
    }

    /// Balance of the own address.
    pub fn self_balance(&mut self) -> Result<U256, EnvError> {
        self.one(OpCode::SELFBALANCE, &[])
    }

    /// Remaining gas after this read.
    pub fn gas_left(&mut self) -> Result<u64, EnvError> {
        self.one(OpCode::GASLEFT, &[])
    }

    /// Own code.
    pub fn self_code(&mut self) -> Result<Bytes, EnvError> {
        Self::expect_one(self.execute(OpCode::CODE, &[])?)
    }

    /// Own code size.
    pub fn self_code_size(&mut self) -> Result<u64, EnvError> {
        self.one(OpCode::CODESIZE, &[])
    }

    /// Charges `amount` gas explicitly.
    pub fn use_gas(&mut self, amount: u64) -> Result<(), EnvError> {
        self.none(OpCode::USEGAS, &[amount.encode()])
    }

    /// Appends a log record with the given topics and data.
    pub fn log(&mut self, topics: &[B256], data: &[u8]) -> Result<(), EnvError> {
        let mut args: Vec<Bytes> = topics.iter().map(|t| t.encode()).collect();
        args.push(Bytes::copy_from_slice(data));
        self.none(OpCode::LOG, &args)
    }

    /// Height of the current block.
    pub fn block_number(&mut self) -> Result<u64, EnvError> {
        self.one(OpCode::NUMBER, &[])
    }

    /// Timestamp of the current block.
    pub fn block_timestamp(&mut self) -> Result<u64, EnvError> {
        self.one(OpCode::TIMESTAMP, &[])
    }

    /// Gas limit of the current block.
    pub fn block_gas_limit(&mut self) -> Result<u64, EnvError> {
        self.one(OpCode::GASLIMIT, &[])
    }

    /// Difficulty of the current block.
    pub fn block_difficulty(&mut self) -> Result<U256, EnvError> {
        self.one(OpCode::DIFFICULTY, &[])
    }

    /// Base fee of the current block.
    pub fn block_base_fee(&mut self) -> Result<U256, EnvError> {
        self.one(OpCode::BASEFEE, &[])
    }

    /// Beneficiary of the current block.
    pub fn block_coinbase(&mut self) -> Result<Address, EnvError> {
        self.one(OpCode::COINBASE, &[])
    }

    /// Randomness beacon output of the current block.
    pub fn block_random(&mut self) -> Result<B256, EnvError> {
        self.one(OpCode::PREVRANDAO, &[])
    }

    /// Hash of ancestor block `number`.
    pub fn block_hash(&mut self, number: u64) -> Result<B256, EnvError> {
        self.one(OpCode::BLOCKHASH, &[number.encode()])
    }

    /// Effective gas price of the transaction.
    pub fn tx_gas_price(&mut self) -> Result<U256, EnvError> {
        self.one(OpCode::GASPRICE, &[])
    }

    /// Origin of the transaction.
    pub fn tx_origin(&mut self) -> Result<Address, EnvError> {
        self.one(OpCode::ORIGIN, &[])
    }

    /// Input data of the call.
    pub fn call_data(&mut self) -> Result<Bytes, EnvError> {
        Self::expect_one(self.execute(OpCode::CALLDATA, &[])?)
    }

    /// Length of the input data.
    pub fn call_data_size(&mut self) -> Result<u64, EnvError> {
        self.one(OpCode::CALLDATASIZE, &[])
    }

    /// Immediate caller of the precompile.
    pub fn caller_address(&mut self) -> Result<Address, EnvError> {
        self.one(OpCode::CALLER, &[])
    }

    /// Value transferred with the call.
    pub fn call_value(&mut self) -> Result<U256, EnvError> {
        self.one(OpCode::CALLVALUE, &[])
    }

    /// Balance of an external address.
    pub fn balance(&mut self, address: Address) -> Result<U256, EnvError> {
        self.one(OpCode::EXTBALANCE, &[address.encode()])
    }

    /// Code of an external address.
    pub fn code(&mut self, address: Address) -> Result<Bytes, EnvError> {
        Self::expect_one(self.execute(OpCode::EXTCODE, &[address.encode()])?)
    }

    /// Code size of an external address.
    pub fn code_size(&mut self, address: Address) -> Result<u64, EnvError> {
        self.one(OpCode::EXTCODESIZE, &[address.encode()])
    }

    /// Code hash of an external address.
    pub fn code_hash(&mut self, address: Address) -> Result<B256, EnvError> {
        self.one(OpCode::EXTCODEHASH, &[address.encode()])
    }

    fn call_outputs(outputs: Vec<Bytes>) -> Result<(Bytes, Option<String>), EnvError> {
        let mut iter = outputs.into_iter();
        let (Some(output), Some(envelope)) = (iter.next(), iter.next()) else {
            return Err(EnvError::InvalidInput);
        };
        Ok((output, decode_error_envelope(&envelope)))
    }

    /// Read-only call into `address`; the callee error travels in the
    /// returned envelope, not as a sticky error.
    pub fn call_static(
        &mut self,
        address: Address,
        input: &[u8],
        gas: u64,
    ) -> Result<(Bytes, Option<String>), EnvError> {
        let args = [
            address.encode(),
            Bytes::copy_from_slice(input),
            gas.encode(),
        ];
        Self::call_outputs(self.execute(OpCode::CALLSTATIC, &args)?)
    }

    /// Calls into `address`, transferring `value`.
    pub fn call(
        &mut self,
        address: Address,
        input: &[u8],
        gas: u64,
        value: U256,
    ) -> Result<(Bytes, Option<String>), EnvError> {
        let args = [
            address.encode(),
            Bytes::copy_from_slice(input),
            gas.encode(),
            value.encode(),
        ];
        Self::call_outputs(self.execute(OpCode::CALL, &args)?)
    }

    /// Calls into `address` with the own storage context.
    pub fn call_delegate(
        &mut self,
        address: Address,
        input: &[u8],
        gas: u64,
    ) -> Result<(Bytes, Option<String>), EnvError> {
        let args = [
            address.encode(),
            Bytes::copy_from_slice(input),
            gas.encode(),
        ];
        Self::call_outputs(self.execute(OpCode::CALLDELEGATE, &args)?)
    }

    fn create_outputs(outputs: Vec<Bytes>) -> Result<(Address, Bytes, Option<String>), EnvError> {
        let mut iter = outputs.into_iter();
        let (Some(addr), Some(output), Some(envelope)) = (iter.next(), iter.next(), iter.next())
        else {
            return Err(EnvError::InvalidInput);
        };
        let address = Address::decode(&addr).map_err(|_| EnvError::InvalidInput)?;
        Ok((address, output, decode_error_envelope(&envelope)))
    }

    /// Creates a contract from `input`.
    pub fn create(
        &mut self,
        input: &[u8],
        value: U256,
    ) -> Result<(Address, Bytes, Option<String>), EnvError> {
        let args = [Bytes::copy_from_slice(input), value.encode()];
        Self::create_outputs(self.execute(OpCode::CREATE, &args)?)
    }

    /// Creates a contract from `input` at the salted address.
    pub fn create2(
        &mut self,
        input: &[u8],
        value: U256,
        salt: B256,
    ) -> Result<(Address, Bytes, Option<String>), EnvError> {
        let args = [Bytes::copy_from_slice(input), value.encode(), salt.encode()];
        Self::create_outputs(self.execute(OpCode::CREATE2, &args)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        caller::{CallOutcome, CreateOutcome},
        context::{BlockEnv, CallEnv},
        gas::constants,
        opcode,
    };
    use alloc::vec;
    use primitives::u64_to_address;
    use state::MemoryStateDB;

    const GAS: u64 = 1_000_000;

    fn config() -> EnvConfig {
        EnvConfig::new(u64_to_address(0x100), GAS)
            .with_flags(EnvFlags::TRUSTED | EnvFlags::EPHEMERAL | EnvFlags::PREIMAGES)
    }

    #[test]
    fn storage_roundtrip_and_gas() {
        let mut db = MemoryStateDB::new();
        let mut env = Environment::new(config(), &mut db);
        let key = B256::with_last_byte(1);
        let value = B256::with_last_byte(7);

        env.storage_store(key, value).unwrap();
        let cold_set = constants::COLD_SLOAD_COST + constants::SSTORE_SET;
        assert_eq!(env.gas().spent(), cold_set);

        assert_eq!(env.storage_load(key).unwrap(), value);
        assert_eq!(
            env.gas().spent(),
            cold_set + constants::WARM_STORAGE_READ_COST
        );
    }

    #[test]
    fn cold_then_warm_load() {
        let mut db = MemoryStateDB::new();
        let mut env = Environment::new(config(), &mut db);
        let key = B256::with_last_byte(2);

        env.storage_load(key).unwrap();
        assert_eq!(env.gas().spent(), constants::COLD_SLOAD_COST);
        env.storage_load(key).unwrap();
        assert_eq!(
            env.gas().spent(),
            constants::COLD_SLOAD_COST + constants::WARM_STORAGE_READ_COST
        );
    }

    #[test]
    fn sstore_clears_records_refund() {
        let mut db = MemoryStateDB::new();
        let addr = config().address;
        db.set_persistent_state(addr, B256::ZERO, B256::with_last_byte(1));
        let mut env = Environment::new(config(), &mut db);
        env.storage_store(B256::ZERO, B256::ZERO).unwrap();
        assert_eq!(env.statedb().refund(), constants::REFUND_SSTORE_CLEARS);
    }

    #[test]
    fn static_violation_is_sticky() {
        let mut db = MemoryStateDB::new();
        let addr = config().address;
        let key = B256::with_last_byte(3);
        db.set_persistent_state(addr, key, B256::with_last_byte(9));

        let cfg = EnvConfig::new(addr, GAS).with_flags(EnvFlags::STATIC);
        let mut env = Environment::new(cfg, &mut db);

        assert_eq!(
            env.storage_store(key, B256::ZERO),
            Err(EnvError::WriteProtection)
        );
        let spent = env.gas().spent();
        // Every following opcode short-circuits with the same error and
        // leaves gas untouched.
        assert_eq!(env.storage_load(key), Err(EnvError::WriteProtection));
        assert_eq!(env.gas().spent(), spent);
        assert_eq!(env.error(), Some(&EnvError::WriteProtection));

        drop(env);
        assert_eq!(db.persistent_state(addr, key), B256::with_last_byte(9));
    }

    #[test]
    fn static_permits_reads() {
        let mut db = MemoryStateDB::new();
        let cfg = EnvConfig::new(u64_to_address(0x100), GAS).with_flags(EnvFlags::STATIC);
        let mut env = Environment::new(cfg, &mut db);
        assert!(env.storage_load(B256::ZERO).is_ok());
        assert!(env.keccak(b"x").is_ok());
    }

    #[test]
    fn untrusted_cannot_touch_ephemeral() {
        let mut db = MemoryStateDB::new();
        let cfg = EnvConfig::new(u64_to_address(0x100), GAS)
            .with_flags(EnvFlags::EPHEMERAL | EnvFlags::PREIMAGES);
        let mut env = Environment::new(cfg, &mut db);
        assert_eq!(
            env.ephemeral_store(B256::ZERO, B256::ZERO),
            Err(EnvError::NotTrusted)
        );
    }

    #[test]
    fn ephemeral_feature_gate() {
        let mut db = MemoryStateDB::new();
        let cfg = EnvConfig::new(u64_to_address(0x100), GAS)
            .with_flags(EnvFlags::TRUSTED | EnvFlags::PREIMAGES);
        let mut env = Environment::new(cfg, &mut db);
        assert_eq!(
            env.ephemeral_load(B256::ZERO),
            Err(EnvError::FeatureDisabled)
        );
    }

    #[test]
    fn preimage_feature_gate() {
        let mut db = MemoryStateDB::new();
        let cfg = EnvConfig::new(u64_to_address(0x100), GAS).with_flags(EnvFlags::TRUSTED);
        let mut env = Environment::new(cfg, &mut db);
        assert_eq!(env.add_preimage(b"x"), Err(EnvError::FeatureDisabled));
    }

    #[test]
    fn ephemeral_roundtrip() {
        let mut db = MemoryStateDB::new();
        let mut env = Environment::new(config(), &mut db);
        let key = B256::with_last_byte(4);
        env.ephemeral_store(key, B256::with_last_byte(1)).unwrap();
        assert_eq!(env.ephemeral_load(key).unwrap(), B256::with_last_byte(1));
    }

    #[test]
    fn empty_preimage_is_special() {
        let mut db = MemoryStateDB::new();
        let mut env = Environment::new(config(), &mut db);
        let hash = env.add_preimage(b"").unwrap();
        assert_eq!(hash, primitives::EMPTY_PREIMAGE_HASH);
        assert_eq!(env.get_preimage(hash).unwrap(), Bytes::new());
        // No storage write happened for the empty preimage.
        drop(env);
        assert_eq!(db.persistent_preimage_size(primitives::EMPTY_PREIMAGE_HASH), 0);
    }

    #[test]
    fn invalid_opcode_is_total() {
        let mut db = MemoryStateDB::new();
        let mut env = Environment::new(config(), &mut db);
        let err = env.execute(OpCode::new_unchecked(0xFE), &[]).unwrap_err();
        assert_eq!(err, EnvError::InvalidOpCode(0xFE));
    }

    #[test]
    fn arity_is_validated() {
        let mut db = MemoryStateDB::new();
        let mut env = Environment::new(config(), &mut db);
        let err = env
            .execute(OpCode::SLOAD, &[Bytes::from_static(b"short")])
            .unwrap_err();
        assert_eq!(err, EnvError::InvalidInput);
    }

    #[test]
    fn out_of_gas_consumes_everything() {
        let mut db = MemoryStateDB::new();
        let cfg = config();
        let mut env = Environment::new(EnvConfig { gas_limit: 10, ..cfg }, &mut db);
        assert_eq!(
            env.storage_load(B256::ZERO),
            Err(EnvError::OutOfGas)
        );
        assert_eq!(env.gas().remaining(), 0);
    }

    #[test]
    fn metering_toggle_stops_charging() {
        let mut db = MemoryStateDB::new();
        let mut env = Environment::new(config(), &mut db);
        env.enable_gas_metering(false).unwrap();
        let spent = env.gas().spent();
        env.storage_load(B256::ZERO).unwrap();
        assert_eq!(env.gas().spent(), spent);
        env.enable_gas_metering(true).unwrap();
        env.storage_load(B256::with_last_byte(9)).unwrap();
        assert!(env.gas().spent() > spent);
    }

    #[test]
    fn block_and_tx_introspection() {
        let mut db = MemoryStateDB::new();
        let block = BlockEnv {
            number: 42,
            timestamp: 1_700_000_000,
            gas_limit: 30_000_000,
            ..Default::default()
        };
        let call = CallEnv {
            caller: u64_to_address(0xabc),
            data: Bytes::from_static(b"input"),
            value: U256::from(5u8),
            ..Default::default()
        };
        let mut env = Environment::new(config(), &mut db)
            .with_block_context(&block)
            .with_call_context(&call);

        assert_eq!(env.block_number().unwrap(), 42);
        assert_eq!(env.block_timestamp().unwrap(), 1_700_000_000);
        assert_eq!(env.block_gas_limit().unwrap(), 30_000_000);
        assert_eq!(env.caller_address().unwrap(), u64_to_address(0xabc));
        assert_eq!(env.call_data().unwrap(), Bytes::from_static(b"input"));
        assert_eq!(env.call_data_size().unwrap(), 5);
        assert_eq!(env.call_value().unwrap(), U256::from(5u8));
    }

    #[test]
    fn missing_context_is_no_data() {
        let mut db = MemoryStateDB::new();
        let mut env = Environment::new(config(), &mut db);
        assert_eq!(env.block_number(), Err(EnvError::NoData));
    }

    #[test]
    fn log_records_block_number() {
        let mut db = MemoryStateDB::new();
        let block = BlockEnv {
            number: 7,
            ..Default::default()
        };
        let mut env = Environment::new(config(), &mut db).with_block_context(&block);
        let topic = B256::with_last_byte(1);
        env.log(&[topic], b"payload").unwrap();
        drop(env);
        let logs = db.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].address, u64_to_address(0x100));
        assert_eq!(logs[0].topics, vec![topic]);
        assert_eq!(logs[0].data, Bytes::from_static(b"payload"));
        assert_eq!(logs[0].block_number, 7);
    }

    #[derive(Debug, Default)]
    struct RecordingCaller {
        calls: Vec<(Address, u64)>,
        refund: u64,
        fail: bool,
    }

    impl Caller for RecordingCaller {
        fn call_static(&mut self, address: Address, _input: &[u8], gas: u64) -> CallOutcome {
            self.call(address, _input, gas, U256::ZERO)
        }

        fn call(&mut self, address: Address, _input: &[u8], gas: u64, _value: U256) -> CallOutcome {
            self.calls.push((address, gas));
            CallOutcome {
                output: Bytes::from_static(b"out"),
                gas_remaining: self.refund,
                error: self.fail.then(|| "execution reverted".into()),
            }
        }

        fn call_delegate(&mut self, address: Address, input: &[u8], gas: u64) -> CallOutcome {
            self.call(address, input, gas, U256::ZERO)
        }

        fn create(&mut self, _input: &[u8], gas: u64, _value: U256) -> CreateOutcome {
            CreateOutcome {
                address: u64_to_address(0xbeef),
                output: Bytes::new(),
                gas_remaining: gas,
                error: None,
            }
        }

        fn create2(&mut self, input: &[u8], gas: u64, value: U256, _salt: B256) -> CreateOutcome {
            self.create(input, gas, value)
        }
    }

    #[test]
    fn child_call_reserves_and_credits_gas() {
        let mut db = MemoryStateDB::new();
        let mut caller = RecordingCaller {
            refund: 500,
            ..Default::default()
        };
        let mut env = Environment::new(config(), &mut db).with_caller(&mut caller);
        let target = u64_to_address(0x9999);

        let (output, error) = env.call(target, b"in", 10_000, U256::ZERO).unwrap();
        assert_eq!(output, Bytes::from_static(b"out"));
        assert!(error.is_none());

        // Cold account access + child gas, minus the child's 500 refund.
        assert_eq!(
            env.gas().spent(),
            constants::COLD_ACCOUNT_ACCESS_COST + 10_000 - 500
        );
        drop(env);
        assert_eq!(caller.calls, vec![(target, 10_000)]);
    }

    #[test]
    fn child_failure_is_not_sticky() {
        let mut db = MemoryStateDB::new();
        let mut caller = RecordingCaller {
            fail: true,
            ..Default::default()
        };
        let mut env = Environment::new(config(), &mut db).with_caller(&mut caller);

        let (_, error) = env
            .call(u64_to_address(1_000), b"", 1_000, U256::ZERO)
            .unwrap();
        assert_eq!(error.as_deref(), Some("execution reverted"));
        assert!(env.error().is_none());
        assert!(env.storage_load(B256::ZERO).is_ok());
    }

    #[test]
    fn create_returns_address() {
        let mut db = MemoryStateDB::new();
        let mut caller = RecordingCaller::default();
        let mut env = Environment::new(config(), &mut db).with_caller(&mut caller);
        let (address, _, error) = env.create(b"initcode", U256::ZERO).unwrap();
        assert_eq!(address, u64_to_address(0xbeef));
        assert!(error.is_none());
    }

    #[test]
    fn child_gas_capped_at_63_of_64() {
        let mut db = MemoryStateDB::new();
        let mut caller = RecordingCaller::default();
        let cfg = EnvConfig::new(u64_to_address(0x100), 64_000)
            .with_flags(EnvFlags::TRUSTED);
        let mut env = Environment::new(cfg, &mut db).with_caller(&mut caller);

        env.call(u64_to_address(0x200), b"", u64::MAX, U256::ZERO)
            .unwrap();
        drop(env);
        let (_, given) = caller.calls[0];
        // The cold account charge lands first; 1/64 of what remains stays
        // with the parent.
        let after_access = 64_000 - constants::COLD_ACCOUNT_ACCESS_COST;
        assert_eq!(given, after_access - after_access / 64);
    }

    #[test]
    fn debug_messages_are_buffered() {
        let mut db = MemoryStateDB::new();
        let mut env = Environment::new(config(), &mut db);
        env.debug("checkpoint reached").unwrap();
        assert_eq!(env.take_debug_messages(), vec!["checkpoint reached"]);
        assert!(env.take_debug_messages().is_empty());
    }

    #[test]
    fn warm_account_pricing_on_second_touch() {
        let mut db = MemoryStateDB::new();
        let mut env = Environment::new(config(), &mut db);
        let target = u64_to_address(0x777);

        env.balance(target).unwrap();
        assert_eq!(env.gas().spent(), constants::COLD_ACCOUNT_ACCESS_COST);
        env.balance(target).unwrap();
        assert_eq!(
            env.gas().spent(),
            constants::COLD_ACCOUNT_ACCESS_COST + constants::WARM_STORAGE_READ_COST
        );
    }

    #[test]
    fn keccak_through_the_table() {
        let mut db = MemoryStateDB::new();
        let mut env = Environment::new(config(), &mut db);
        assert_eq!(env.keccak(b""), Ok(primitives::KECCAK_EMPTY));
        assert_eq!(
            env.gas().spent(),
            constants::KECCAK256
        );
    }

    #[test]
    fn opcode_names_match_table() {
        assert_eq!(opcode::SLOAD, 0x54);
        assert_eq!(OpCode::SLOAD.get(), 0x54);
    }

    #[test]
    fn self_introspection() {
        let mut db = MemoryStateDB::new();
        let me = config().address;
        db.set_balance(me, U256::from(1234u64));
        db.set_code(me, Bytes::from_static(b"\x60\x00"));
        let mut env = Environment::new(config(), &mut db);

        assert_eq!(env.self_address().unwrap(), me);
        assert_eq!(env.self_balance().unwrap(), U256::from(1234u64));
        assert_eq!(env.self_code().unwrap(), Bytes::from_static(b"\x60\x00"));
        assert_eq!(env.self_code_size().unwrap(), 2);

        let before = env.gas().remaining();
        let reported = env.gas_left().unwrap();
        // GASLEFT reports the budget after its own constant charge.
        assert_eq!(reported, before - constants::BASE);
    }

    #[test]
    fn use_gas_charges_exactly() {
        let mut db = MemoryStateDB::new();
        let mut env = Environment::new(config(), &mut db);
        env.use_gas(12_345).unwrap();
        assert_eq!(env.gas().spent(), 12_345);
    }

    #[test]
    fn block_hash_and_randomness() {
        let mut db = MemoryStateDB::new();
        let mut hashes = primitives::HashMap::default();
        hashes.insert(41u64, B256::with_last_byte(0xaa));
        let block = BlockEnv {
            number: 42,
            random: B256::with_last_byte(0xbb),
            hashes,
            ..Default::default()
        };
        let mut env = Environment::new(config(), &mut db).with_block_context(&block);

        assert_eq!(env.block_hash(41).unwrap(), B256::with_last_byte(0xaa));
        assert_eq!(env.block_hash(7).unwrap(), B256::ZERO);
        assert_eq!(env.block_random().unwrap(), B256::with_last_byte(0xbb));
    }

    #[test]
    fn tx_fields() {
        let mut db = MemoryStateDB::new();
        let call = CallEnv {
            gas_price: U256::from(30_000_000_000u64),
            origin: u64_to_address(0xfeed),
            ..Default::default()
        };
        let mut env = Environment::new(config(), &mut db).with_call_context(&call);
        assert_eq!(env.tx_gas_price().unwrap(), U256::from(30_000_000_000u64));
        assert_eq!(env.tx_origin().unwrap(), u64_to_address(0xfeed));
    }

    #[test]
    fn external_code_family() {
        let mut db = MemoryStateDB::new();
        let target = u64_to_address(0x2222);
        db.set_code(target, Bytes::from_static(b"\xfe"));
        let mut env = Environment::new(config(), &mut db);

        assert_eq!(env.code(target).unwrap(), Bytes::from_static(b"\xfe"));
        assert_eq!(env.code_size(target).unwrap(), 1);
        assert_eq!(
            env.code_hash(target).unwrap(),
            primitives::keccak256(b"\xfe")
        );
    }

    #[test]
    fn delegate_and_static_calls_route_through_caller() {
        let mut db = MemoryStateDB::new();
        let mut caller = RecordingCaller::default();
        let mut env = Environment::new(config(), &mut db).with_caller(&mut caller);
        let target = u64_to_address(0x3333);

        let (output, error) = env.call_delegate(target, b"", 1_000).unwrap();
        assert_eq!(output, Bytes::from_static(b"out"));
        assert!(error.is_none());
        let (output, _) = env.call_static(target, b"", 1_000).unwrap();
        assert_eq!(output, Bytes::from_static(b"out"));
        drop(env);
        assert_eq!(caller.calls.len(), 2);
    }

    #[test]
    fn create2_charges_initcode_hashing() {
        let mut db = MemoryStateDB::new();
        let mut caller = RecordingCaller::default();
        let mut env = Environment::new(config(), &mut db).with_caller(&mut caller);

        let initcode = [0u8; 40];
        let (address, _, error) = env
            .create2(&initcode, U256::ZERO, B256::with_last_byte(1))
            .unwrap();
        assert_eq!(address, u64_to_address(0xbeef));
        assert!(error.is_none());
        // Base creation cost plus two words of initcode hashing; the
        // mock returns all child gas.
        assert_eq!(
            env.gas().spent(),
            constants::CREATE + 2 * constants::KECCAK256WORD
        );
    }

    #[test]
    fn time_now_is_trusted_only() {
        let mut db = MemoryStateDB::new();
        let cfg = EnvConfig::new(u64_to_address(0x100), GAS);
        let mut env = Environment::new(cfg, &mut db);
        assert_eq!(env.time_now(), Err(EnvError::NotTrusted));

        let mut db = MemoryStateDB::new();
        let mut env = Environment::new(config(), &mut db);
        assert!(env.time_now().unwrap() > 0);
    }
}
