//! Modules: external capability units attached to accounts.
//!
//! The account only ever talks to a module through the `IModule` ABI. [`Module`] is the Rust
//! side of that interface; [`ModuleProgram`] turns any implementation into host code.

use core::fmt::Debug;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolInterface};
use auto_impl::auto_impl;
use smart_account_contracts::IModule::{self, IModuleCalls};

use crate::{CallResult, ClientError, Code, Frame, Host, ModuleType, Program, Revert};

/// The context a module hook runs in.
#[derive(Debug)]
pub struct ModuleContext<'a> {
    host: &'a mut Host,
    frame: &'a Frame,
}

impl<'a> ModuleContext<'a> {
    /// Creates the context of a module call frame.
    pub fn new(host: &'a mut Host, frame: &'a Frame) -> Self {
        Self { host, frame }
    }

    /// The account invoking the hook.
    pub const fn account(&self) -> Address {
        self.frame.caller
    }

    /// The module's own address.
    pub const fn module(&self) -> Address {
        self.frame.address
    }

    /// Reads a slot of the module's storage.
    pub fn sload(&mut self, key: U256) -> U256 {
        self.host.sload(self.frame.address, key)
    }

    /// Writes a slot of the module's storage.
    pub fn sstore(&mut self, key: U256, value: U256) {
        self.host.sstore(self.frame.address, key, value);
    }

    /// Gives access to the host, e.g. to call back into the account.
    pub fn host(&mut self) -> &mut Host {
        self.host
    }
}

/// A capability unit that can be installed on accounts.
///
/// Variants (validators, executors, fallback handlers, hooks) are told apart only by
/// [`Module::is_module_type`]; the registry never looks at anything else.
#[auto_impl(&, Box, Arc)]
pub trait Module: Debug + Send + Sync {
    /// Called by an account when the module is installed on it.
    fn on_install(&self, ctx: &mut ModuleContext<'_>, data: &Bytes) -> Result<(), Revert>;

    /// Called by an account when the module is uninstalled from it.
    fn on_uninstall(&self, ctx: &mut ModuleContext<'_>, data: &Bytes) -> Result<(), Revert>;

    /// Returns `true` if the module acts as `module_type`.
    fn is_module_type(&self, module_type: ModuleType) -> bool;

    /// Returns `true` if the module holds configuration for `account`.
    fn is_initialized(&self, ctx: &mut ModuleContext<'_>, account: Address) -> bool;
}

/// Exposes a [`Module`] as host code speaking the `IModule` ABI.
#[derive(Debug, Clone)]
pub struct ModuleProgram<M>(pub M);

impl<M: Module + 'static> ModuleProgram<M> {
    /// Wraps the module into deployable code.
    pub fn into_code(self, name: &str) -> Code {
        Code::native(name, self)
    }
}

impl<M: Module> Program for ModuleProgram<M> {
    fn run(&self, host: &mut Host, frame: &Frame) -> CallResult {
        let Ok(call) = IModuleCalls::abi_decode(&frame.input, true) else {
            return Err(Revert::empty());
        };
        let mut ctx = ModuleContext::new(host, frame);
        let output = match call {
            IModuleCalls::onInstall(call) => {
                self.0.on_install(&mut ctx, &call.data)?;
                Bytes::new()
            }
            IModuleCalls::onUninstall(call) => {
                self.0.on_uninstall(&mut ctx, &call.data)?;
                Bytes::new()
            }
            IModuleCalls::isModuleType(call) => {
                let is_type = ModuleType::from_id(call.moduleTypeId)
                    .is_some_and(|module_type| self.0.is_module_type(module_type));
                IModule::isModuleTypeCall::abi_encode_returns(&(is_type,)).into()
            }
            IModuleCalls::isInitialized(call) => {
                let initialized = self.0.is_initialized(&mut ctx, call.smartAccount);
                IModule::isInitializedCall::abi_encode_returns(&(initialized,)).into()
            }
        };
        Ok(output)
    }
}

/// Asks the module deployed at `module` whether it acts as `module_type`.
pub fn query_module_type(
    host: &mut Host,
    module: Address,
    module_type: ModuleType,
) -> Result<bool, ClientError> {
    let input = IModule::isModuleTypeCall { moduleTypeId: module_type.into() }.abi_encode();
    let output = host.view(Address::ZERO, module, input.into())?;
    Ok(IModule::isModuleTypeCall::abi_decode_returns(&output, true)?._0)
}

/// Asks the module deployed at `module` whether it holds configuration for `account`.
pub fn query_module_initialized(
    host: &mut Host,
    module: Address,
    account: Address,
) -> Result<bool, ClientError> {
    let input = IModule::isInitializedCall { smartAccount: account }.abi_encode();
    let output = host.view(Address::ZERO, module, input.into())?;
    Ok(IModule::isInitializedCall::abi_decode_returns(&output, true)?._0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockModule;
    use alloy_primitives::address;

    const MODULE: Address = address!("4000000000000000000000000000000000000004");
    const ACCOUNT: Address = address!("a000000000000000000000000000000000000000");

    #[test]
    fn test_module_program_type_queries() {
        let mut host =
            Host::default().with_code(MODULE, MockModule::new(ModuleType::Validator).into_code());
        assert!(query_module_type(&mut host, MODULE, ModuleType::Validator).unwrap());
        assert!(!query_module_type(&mut host, MODULE, ModuleType::Hook).unwrap());
    }

    #[test]
    fn test_unknown_type_id_is_not_a_member() {
        let mut host =
            Host::default().with_code(MODULE, MockModule::new(ModuleType::Executor).into_code());
        let input = IModule::isModuleTypeCall { moduleTypeId: U256::from(9) }.abi_encode();
        let output = host.view(Address::ZERO, MODULE, input.into()).unwrap();
        assert!(!IModule::isModuleTypeCall::abi_decode_returns(&output, true).unwrap()._0);
    }

    #[test]
    fn test_install_hook_initializes_caller() {
        let mut host =
            Host::default().with_code(MODULE, MockModule::new(ModuleType::Executor).into_code());
        assert!(!query_module_initialized(&mut host, MODULE, ACCOUNT).unwrap());

        let input = IModule::onInstallCall { data: Bytes::new() }.abi_encode();
        host.transact_with(|host| host.call(ACCOUNT, MODULE, U256::ZERO, input.into())).unwrap();
        assert!(query_module_initialized(&mut host, MODULE, ACCOUNT).unwrap());

        let input = IModule::onUninstallCall { data: Bytes::new() }.abi_encode();
        host.transact_with(|host| host.call(ACCOUNT, MODULE, U256::ZERO, input.into())).unwrap();
        assert!(!query_module_initialized(&mut host, MODULE, ACCOUNT).unwrap());
    }

    #[test]
    fn test_malformed_calldata_reverts() {
        let mut host =
            Host::default().with_code(MODULE, MockModule::new(ModuleType::Hook).into_code());
        let result = host.view(Address::ZERO, MODULE, Bytes::from_static(&[1, 2, 3]));
        assert_eq!(result, Err(Revert::empty()));
    }
}
