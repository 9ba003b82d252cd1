use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use smart_account_contracts::{IModule, ISmartAccount};
use tracing::debug;

use super::storage;
use crate::{AccountError, Host};

/// The set of modules installed on one account.
///
/// Membership is flipped *before* the module's lifecycle hook runs, so a hook that calls back
/// into the account already observes the new membership. A failing hook fails the whole
/// operation; undoing the membership flip is left to the host's rollback of the enclosing call.
#[derive(Debug)]
pub struct ModuleRegistry<'a> {
    host: &'a mut Host,
    account: Address,
}

impl<'a> ModuleRegistry<'a> {
    /// Opens the registry of `account`.
    pub fn new(host: &'a mut Host, account: Address) -> Self {
        Self { host, account }
    }

    /// Returns `true` if `module` is installed.
    pub fn is_installed(&mut self, module: Address) -> bool {
        storage::is_installed(self.host, self.account, module)
    }

    /// Installs `module` and calls its `onInstall(data)` hook.
    pub fn install(&mut self, module: Address, data: Bytes) -> Result<(), AccountError> {
        if self.is_installed(module) {
            return Err(AccountError::AlreadyInstalled(module));
        }

        storage::set_installed(self.host, self.account, module, true);
        self.call_hook(module, IModule::onInstallCall { data }.abi_encode())?;
        self.host.emit_event(self.account, &ISmartAccount::ModuleInstalled { module });
        debug!(
            target: "smart_account::account",
            account = %self.account,
            %module,
            "module installed"
        );
        Ok(())
    }

    /// Uninstalls `module` and calls its `onUninstall(data)` hook.
    pub fn uninstall(&mut self, module: Address, data: Bytes) -> Result<(), AccountError> {
        if !self.is_installed(module) {
            return Err(AccountError::NotInstalled(module));
        }

        storage::set_installed(self.host, self.account, module, false);
        self.call_hook(module, IModule::onUninstallCall { data }.abi_encode())?;
        self.host.emit_event(self.account, &ISmartAccount::ModuleUninstalled { module });
        debug!(
            target: "smart_account::account",
            account = %self.account,
            %module,
            "module uninstalled"
        );
        Ok(())
    }

    fn call_hook(&mut self, module: Address, input: Vec<u8>) -> Result<(), AccountError> {
        self.host
            .call(self.account, module, U256::ZERO, input.into())
            .map(|_| ())
            .map_err(|revert| AccountError::CallReverted(revert.output))
    }
}
