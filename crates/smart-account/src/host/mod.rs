//! The in-process ledger accounts, factories and modules run on.
//!
//! State lives in a revm [`Journal`] over an in-memory [`CacheDB`]: balances, nonces, code,
//! storage and logs are journaled by revm, so a failing call frame rolls back exactly its own
//! changes and a failing transaction rolls back all of them. Committed transactions are flushed
//! into the database.
//!
//! On top of the journal the host dispatches calls to native [`Program`]s. The code stored for an
//! address is ordinary revm [`Bytecode`](revm::state::Bytecode). The program registered for the
//! address runs only while the account's code hash still matches it, so rolled-back deployments
//! never dispatch.
//!
//! Transactions are strictly serialized: every public entry point takes `&mut self`.

mod code;
mod result;

pub use code::*;
pub use result::*;

use core::convert::Infallible;

use alloy_primitives::{map::HashMap, Address, Bytes, Log, B256, U256};
use alloy_sol_types::SolEvent;
use revm::{
    context::{result::HaltReason, JournalOutput, JournalTr},
    database::{CacheDB, EmptyDB},
    primitives::{hardfork::SpecId, KECCAK_EMPTY},
    state::Account,
    DatabaseCommit, Journal,
};
use tracing::{debug, trace, warn};

use crate::HostConfig;

/// The database committed state is kept in.
pub type LedgerDb = CacheDB<EmptyDB>;

/// Loads from [`LedgerDb`] cannot fail.
fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// The ledger.
#[derive(Debug)]
pub struct Host {
    config: HostConfig,
    journal: Journal<LedgerDb>,
    programs: HashMap<Address, Code>,
    logs: Vec<Log>,
    depth: usize,
}

impl Default for Host {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

impl Host {
    /// Creates an empty ledger with the given configuration.
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            journal: JournalTr::new(CacheDB::new(EmptyDB::default())),
            programs: HashMap::default(),
            logs: Vec::new(),
            depth: 0,
        }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Returns the committed state.
    pub const fn db(&self) -> &LedgerDb {
        &self.journal.database
    }

    // ------------------------------------------------------------------------
    // Genesis setters. These commit immediately and must not be used while a transaction is
    // executing.
    // ------------------------------------------------------------------------

    /// Sets the balance of an address.
    pub fn set_balance(&mut self, address: Address, balance: U256) {
        let account = self.load(address);
        account.info.balance = balance;
        account.mark_touch();
        self.commit();
    }

    /// Sets the balance of an address.
    pub fn with_balance(mut self, address: Address, balance: U256) -> Self {
        self.set_balance(address, balance);
        self
    }

    /// Sets the nonce of an address.
    pub fn set_nonce(&mut self, address: Address, nonce: u64) {
        let account = self.load(address);
        account.info.nonce = nonce;
        account.mark_touch();
        self.commit();
    }

    /// Deploys code at an address. Contracts placed this way get nonce 1.
    pub fn set_code(&mut self, address: Address, code: Code) {
        let account = self.load(address);
        account.info.nonce = account.info.nonce.max(1);
        account.mark_touch();
        self.journal.set_code(address, code.to_bytecode());
        self.programs.insert(address, code);
        self.commit();
    }

    /// Deploys code at an address.
    pub fn with_code(mut self, address: Address, code: Code) -> Self {
        self.set_code(address, code);
        self
    }

    /// Sets a storage slot of an address.
    pub fn set_storage(&mut self, address: Address, key: U256, value: U256) {
        self.sstore(address, key, value);
        self.commit();
    }

    // ------------------------------------------------------------------------
    // Reads. Accounts are loaded into the journal, so reads observe the state of the
    // transaction in progress.
    // ------------------------------------------------------------------------

    fn load(&mut self, address: Address) -> &mut Account {
        infallible(self.journal.load_account_code(address)).data
    }

    /// Returns the balance of an address.
    pub fn balance(&mut self, address: Address) -> U256 {
        self.load(address).info.balance
    }

    /// Returns the nonce of an address.
    pub fn nonce(&mut self, address: Address) -> u64 {
        self.load(address).info.nonce
    }

    /// Returns the hash of the code deployed at an address.
    pub fn code_hash(&mut self, address: Address) -> B256 {
        self.load(address).info.code_hash
    }

    /// Returns `true` if code is deployed at an address.
    pub fn has_code(&mut self, address: Address) -> bool {
        let hash = self.code_hash(address);
        hash != KECCAK_EMPTY && !hash.is_zero()
    }

    /// Returns the code deployed at an address, if a program was registered for it.
    pub fn code(&mut self, address: Address) -> Option<Code> {
        let hash = self.code_hash(address);
        self.programs.get(&address).filter(|code| code.hash() == hash).cloned()
    }

    /// Reads a storage slot (`SLOAD`).
    pub fn sload(&mut self, address: Address, key: U256) -> U256 {
        self.load(address);
        infallible(self.journal.sload(address, key)).data
    }

    /// Returns every log emitted by committed transactions that was not taken with
    /// [`Self::take_logs`]. The ledger only appends to it.
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Drains the committed logs.
    pub fn take_logs(&mut self) -> Vec<Log> {
        core::mem::take(&mut self.logs)
    }

    // ------------------------------------------------------------------------
    // Journaled writes
    // ------------------------------------------------------------------------

    /// Writes a storage slot (`SSTORE`).
    pub fn sstore(&mut self, address: Address, key: U256, value: U256) {
        self.load(address);
        infallible(self.journal.sstore(address, key, value));
        self.journal.touch_account(address);
    }

    /// Emits a log.
    pub fn emit(&mut self, log: Log) {
        trace!(
            target: "smart_account::host",
            address = %log.address,
            topics = log.topics().len(),
            "log"
        );
        self.journal.log(log);
    }

    /// Emits a Solidity event from `address`.
    pub fn emit_event<E: SolEvent>(&mut self, address: Address, event: &E) {
        self.emit(Log { address, data: event.encode_log_data() });
    }

    /// Increments the nonce of `address` and returns its previous value.
    fn bump_nonce(&mut self, address: Address) -> Result<u64, Revert> {
        let nonce = self.nonce(address);
        if infallible(self.journal.inc_account_nonce(address)).is_none() {
            warn!(target: "smart_account::host", %address, "nonce overflow");
            return Err(Revert::empty());
        }
        Ok(nonce)
    }

    fn transfer(&mut self, from: Address, to: Address, value: U256) -> Result<(), Revert> {
        if value.is_zero() {
            self.load(to);
            self.journal.touch_account(to);
            return Ok(());
        }
        self.load(from);
        self.load(to);
        match infallible(self.journal.transfer(&from, &to, value)) {
            None => Ok(()),
            Some(error) => {
                debug!(
                    target: "smart_account::host",
                    %from,
                    %to,
                    %value,
                    ?error,
                    "transfer failed"
                );
                Err(Revert::empty())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    /// Calls `target` with `value` and `input` on behalf of `caller` (`CALL`).
    ///
    /// Calls to addresses without a registered program only transfer value. If the transfer or
    /// the callee fails, every change made by this call is rolled back and the callee's revert
    /// payload is returned unchanged.
    pub fn call(
        &mut self,
        caller: Address,
        target: Address,
        value: U256,
        input: Bytes,
    ) -> CallResult {
        let frame = Frame {
            caller,
            address: target,
            code_address: target,
            value,
            input,
            depth: self.depth + 1,
        };
        self.run_frame(frame, true)
    }

    /// Runs the code of `code_address` in the storage, caller and value context of `frame`
    /// (`DELEGATECALL`). No value is transferred.
    pub fn delegate_call(
        &mut self,
        frame: &Frame,
        code_address: Address,
        input: Bytes,
    ) -> CallResult {
        let frame = Frame {
            caller: frame.caller,
            address: frame.address,
            code_address,
            value: frame.value,
            input,
            depth: self.depth + 1,
        };
        self.run_frame(frame, false)
    }

    fn run_frame(&mut self, frame: Frame, transfer_value: bool) -> CallResult {
        if frame.depth > self.config.max_call_depth {
            warn!(target: "smart_account::host", depth = frame.depth, "call depth exceeded");
            return Err(Revert::empty());
        }

        trace!(
            target: "smart_account::host",
            caller = %frame.caller,
            address = %frame.address,
            code_address = %frame.code_address,
            value = %frame.value,
            depth = frame.depth,
            "call"
        );

        let checkpoint = self.journal.checkpoint();
        if transfer_value {
            if let Err(revert) = self.transfer(frame.caller, frame.address, frame.value) {
                self.journal.checkpoint_revert(checkpoint);
                return Err(revert);
            }
        }

        let Some(program) = self.code(frame.code_address).map(|code| code.program()) else {
            self.journal.checkpoint_commit();
            return Ok(Bytes::new());
        };

        self.depth += 1;
        let result = program.run(self, &frame);
        self.depth -= 1;

        match &result {
            Ok(_) => self.journal.checkpoint_commit(),
            Err(revert) => {
                trace!(
                    target: "smart_account::host",
                    address = %frame.address,
                    output = ?revert.output,
                    "call reverted"
                );
                self.journal.checkpoint_revert(checkpoint);
            }
        }
        result
    }

    /// Deploys `code` from `deployer` at `keccak256(rlp([deployer, nonce]))[12..]` (`CREATE`).
    pub fn create(&mut self, deployer: Address, code: Code) -> Result<Address, Revert> {
        let nonce = self.bump_nonce(deployer)?;
        self.deploy(deployer, deployer.create(nonce), code)
    }

    /// Deploys `code` from `deployer` at
    /// `keccak256(0xff ++ deployer ++ salt ++ keccak256(init_code))[12..]` (`CREATE2`).
    pub fn create2(
        &mut self,
        deployer: Address,
        salt: B256,
        init_code: &[u8],
        code: Code,
    ) -> Result<Address, Revert> {
        self.bump_nonce(deployer)?;
        self.deploy(deployer, deployer.create2_from_code(salt, init_code), code)
    }

    /// Creates the account at `address` and stores `code` in it. Addresses that already hold
    /// code or have a non-zero nonce collide.
    fn deploy(
        &mut self,
        deployer: Address,
        address: Address,
        code: Code,
    ) -> Result<Address, Revert> {
        self.load(address);
        if let Err(error) =
            self.journal.create_account_checkpoint(deployer, address, U256::ZERO, SpecId::PRAGUE)
        {
            warn!(target: "smart_account::host", %address, ?error, "create failed");
            return Err(Revert::empty());
        }
        self.journal.set_code(address, code.to_bytecode());
        self.journal.checkpoint_commit();
        self.programs.insert(address, code);
        debug!(target: "smart_account::host", %address, "contract deployed");
        Ok(address)
    }

    /// Executes a transaction. The sender's nonce is bumped whether or not the call succeeds;
    /// every other change is rolled back on failure. A sender whose nonce cannot be bumped halts
    /// the transaction before anything runs.
    pub fn transact(&mut self, tx: TxEnv) -> ExecutionResult {
        let TxEnv { caller, to, value, data } = tx;
        if self.bump_nonce(caller).is_err() {
            return ExecutionResult::Halt { reason: HaltReason::NonceOverflow };
        }

        let result = self.call(caller, to, value, data);
        let logs = self.commit();
        let result = match result {
            Ok(output) => ExecutionResult::Success { output, logs },
            Err(Revert { output }) => ExecutionResult::Revert { output },
        };
        debug!(
            target: "smart_account::host",
            %caller,
            %to,
            success = result.is_success(),
            "transaction executed"
        );
        result
    }

    /// Runs host code as a single atomic transaction. If `f` fails, all of its changes are
    /// rolled back.
    pub fn transact_with<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, Revert>,
    ) -> Result<T, Revert> {
        let checkpoint = self.journal.checkpoint();
        let result = f(self);
        if result.is_ok() {
            self.journal.checkpoint_commit();
        } else {
            self.journal.checkpoint_revert(checkpoint);
        }
        if self.depth == 0 {
            self.commit();
        }
        result
    }

    /// Calls `target` and rolls back every change afterwards (`eth_call`).
    pub fn view(&mut self, caller: Address, target: Address, input: Bytes) -> CallResult {
        let checkpoint = self.journal.checkpoint();
        let result = self.call(caller, target, U256::ZERO, input);
        self.journal.checkpoint_revert(checkpoint);
        result
    }

    /// Flushes the journal into the database and returns the logs it held.
    fn commit(&mut self) -> Vec<Log> {
        let JournalOutput { state, logs } = self.journal.finalize();
        self.journal.database.commit(state);
        self.logs.extend_from_slice(&logs);
        logs
    }
}
