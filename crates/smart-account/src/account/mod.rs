//! The smart account.
//!
//! [`SmartAccount`] is the account implementation program. It is deployed once per factory and
//! every user account is a minimal proxy delegating to it, so all state lives in the proxy's
//! storage (see [`storage`]) and the only per-implementation value, the entry point, is fixed in
//! the program itself like a Solidity immutable.
//!
//! The account is made of three parts:
//!
//! - the execution gateway (`validateUserOp`, `execute`, `executeBatch`, `transferOwnership`)
//! - the [`ModuleRegistry`] (`installModule`, `uninstallModule`, `isModuleInstalled`)
//! - one-time initialization (`initialize`)

mod gateway;
mod registry;
mod signature;
pub mod storage;

pub use registry::*;
pub use signature::*;

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{SolCall, SolInterface};
use smart_account_contracts::ISmartAccount::{self, ISmartAccountCalls};
use tracing::trace;

use crate::{AccountError, CallResult, Code, Frame, Host, Program, Revert};

/// Name under which the account implementation is stored as native code.
pub const ACCOUNT_CODE_NAME: &str = "SmartAccount";

/// The account implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmartAccount {
    entry_point: Address,
}

impl SmartAccount {
    /// Creates an account implementation trusting `entry_point` as its operation processor.
    pub const fn new(entry_point: Address) -> Self {
        Self { entry_point }
    }

    /// Returns the operation processor.
    pub const fn entry_point(&self) -> Address {
        self.entry_point
    }

    /// Wraps the implementation into deployable code.
    pub fn into_code(self) -> Code {
        Code::native(ACCOUNT_CODE_NAME, self)
    }

    fn dispatch(
        &self,
        host: &mut Host,
        frame: &Frame,
        call: ISmartAccountCalls,
    ) -> Result<Bytes, AccountError> {
        let output = match call {
            ISmartAccountCalls::initialize(call) => {
                self.initialize(host, frame, call.owner)?;
                Bytes::new()
            }
            ISmartAccountCalls::owner(_) => {
                let owner = storage::owner(host, frame.address);
                ISmartAccount::ownerCall::abi_encode_returns(&(owner,)).into()
            }
            ISmartAccountCalls::entryPoint(_) => {
                ISmartAccount::entryPointCall::abi_encode_returns(&(self.entry_point,)).into()
            }
            ISmartAccountCalls::validateUserOp(call) => {
                let code = self.validate_user_op(
                    host,
                    frame,
                    &call.userOp,
                    call.userOpHash,
                    call.missingAccountFunds,
                )?;
                ISmartAccount::validateUserOpCall::abi_encode_returns(&(code.to_u256(),)).into()
            }
            ISmartAccountCalls::execute(call) => {
                let result = self.execute(host, frame, call.target, call.value, call.data)?;
                ISmartAccount::executeCall::abi_encode_returns(&(result,)).into()
            }
            ISmartAccountCalls::executeBatch(call) => {
                self.execute_batch(host, frame, call.targets, call.values, call.datas)?;
                Bytes::new()
            }
            ISmartAccountCalls::transferOwnership(call) => {
                self.transfer_ownership(host, frame, call.newOwner)?;
                Bytes::new()
            }
            ISmartAccountCalls::installModule(call) => {
                self.require_module_manager(host, frame)?;
                ModuleRegistry::new(host, frame.address).install(call.module, call.data)?;
                Bytes::new()
            }
            ISmartAccountCalls::uninstallModule(call) => {
                self.require_module_manager(host, frame)?;
                ModuleRegistry::new(host, frame.address).uninstall(call.module, call.data)?;
                Bytes::new()
            }
            ISmartAccountCalls::isModuleInstalled(call) => {
                let installed = ModuleRegistry::new(host, frame.address).is_installed(call.module);
                ISmartAccount::isModuleInstalledCall::abi_encode_returns(&(installed,)).into()
            }
        };
        Ok(output)
    }
}

impl Program for SmartAccount {
    fn run(&self, host: &mut Host, frame: &Frame) -> CallResult {
        // Plain value transfers fund the account.
        if frame.input.is_empty() {
            return Ok(Bytes::new());
        }

        let Ok(call) = ISmartAccountCalls::abi_decode(&frame.input, true) else {
            trace!(target: "smart_account::account", account = %frame.address, "unknown selector");
            return Err(Revert::empty());
        };
        self.dispatch(host, frame, call).map_err(Revert::from)
    }
}
