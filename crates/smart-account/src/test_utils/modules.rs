use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolError};
use smart_account_contracts::ISmartAccount;

use crate::{Code, Host, Module, ModuleContext, ModuleProgram, ModuleType, Revert};

fn account_slot(account: Address) -> U256 {
    U256::from_be_slice(account.as_slice())
}

/// A module of a single type that marks accounts as initialized while it is installed on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockModule {
    module_type: ModuleType,
}

impl MockModule {
    /// Creates a module acting as `module_type`.
    pub const fn new(module_type: ModuleType) -> Self {
        Self { module_type }
    }

    /// Wraps the module into deployable code.
    pub fn into_code(self) -> Code {
        ModuleProgram(self).into_code("MockModule")
    }
}

impl Module for MockModule {
    fn on_install(&self, ctx: &mut ModuleContext<'_>, _data: &Bytes) -> Result<(), Revert> {
        let account = ctx.account();
        ctx.sstore(account_slot(account), U256::from(1));
        Ok(())
    }

    fn on_uninstall(&self, ctx: &mut ModuleContext<'_>, _data: &Bytes) -> Result<(), Revert> {
        let account = ctx.account();
        ctx.sstore(account_slot(account), U256::ZERO);
        Ok(())
    }

    fn is_module_type(&self, module_type: ModuleType) -> bool {
        module_type == self.module_type
    }

    fn is_initialized(&self, ctx: &mut ModuleContext<'_>, account: Address) -> bool {
        !ctx.sload(account_slot(account)).is_zero()
    }
}

/// A module whose hooks always revert with `Error("module failure")`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingModule;

impl FailingModule {
    /// Revert reason of both hooks.
    pub const FAILURE: &'static str = "module failure";

    /// Wraps the module into deployable code.
    pub fn into_code(self) -> Code {
        ModuleProgram(self).into_code("FailingModule")
    }

    /// The revert payload of both hooks.
    pub fn failure() -> Bytes {
        alloy_sol_types::Revert { reason: Self::FAILURE.into() }.abi_encode().into()
    }
}

impl Module for FailingModule {
    fn on_install(&self, _ctx: &mut ModuleContext<'_>, _data: &Bytes) -> Result<(), Revert> {
        Err(Revert::new(Self::failure()))
    }

    fn on_uninstall(&self, _ctx: &mut ModuleContext<'_>, _data: &Bytes) -> Result<(), Revert> {
        Err(Revert::new(Self::failure()))
    }

    fn is_module_type(&self, _module_type: ModuleType) -> bool {
        true
    }

    fn is_initialized(&self, _ctx: &mut ModuleContext<'_>, _account: Address) -> bool {
        false
    }
}

/// A module that asks the account whether it is installed while its hooks run, and records the
/// answer per account: `1` for "not installed", `2` for "installed".
#[derive(Debug, Clone, Copy, Default)]
pub struct MembershipWitness;

impl MembershipWitness {
    /// Wraps the module into deployable code.
    pub fn into_code(self) -> Code {
        ModuleProgram(self).into_code("MembershipWitness")
    }

    /// Returns the membership the witness at `witness` observed during the last hook `account`
    /// invoked, or `None` if no hook ran.
    pub fn observed(host: &mut Host, witness: Address, account: Address) -> Option<bool> {
        match host.sload(witness, account_slot(account)).to::<u8>() {
            1 => Some(false),
            2 => Some(true),
            _ => None,
        }
    }

    fn record(ctx: &mut ModuleContext<'_>) -> Result<(), Revert> {
        let (account, module) = (ctx.account(), ctx.module());
        let input = ISmartAccount::isModuleInstalledCall { module }.abi_encode();
        let output = ctx.host().call(module, account, U256::ZERO, input.into())?;
        let installed = ISmartAccount::isModuleInstalledCall::abi_decode_returns(&output, true)
            .map_err(|_| Revert::empty())?
            ._0;
        ctx.sstore(account_slot(account), U256::from(1 + u8::from(installed)));
        Ok(())
    }
}

impl Module for MembershipWitness {
    fn on_install(&self, ctx: &mut ModuleContext<'_>, _data: &Bytes) -> Result<(), Revert> {
        Self::record(ctx)
    }

    fn on_uninstall(&self, ctx: &mut ModuleContext<'_>, _data: &Bytes) -> Result<(), Revert> {
        Self::record(ctx)
    }

    fn is_module_type(&self, module_type: ModuleType) -> bool {
        module_type == ModuleType::Hook
    }

    fn is_initialized(&self, ctx: &mut ModuleContext<'_>, account: Address) -> bool {
        !ctx.sload(account_slot(account)).is_zero()
    }
}
