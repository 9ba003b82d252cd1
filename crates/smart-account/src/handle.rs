//! Typed access to deployed accounts and factories.
//!
//! The handles encode calls with the `ISmartAccount` and `IAccountFactory` ABIs, send them to
//! the [`Host`] and decode the results, mapping reverts to [`AccountError`](crate::AccountError).
//! State-changing calls run as transactions; getters run as rolled-back views.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use smart_account_contracts::{IAccountFactory, ISmartAccount};

use crate::{
    ClientError, ExecutionResult, Host, PackedUserOperation, Revert, TxEnv, ValidationCode,
};

fn transact<C: SolCall>(
    host: &mut Host,
    caller: Address,
    to: Address,
    value: U256,
    call: &C,
) -> Result<C::Return, ClientError> {
    let tx = TxEnv { caller, to, value, data: call.abi_encode().into() };
    let output = match host.transact(tx) {
        ExecutionResult::Success { output, .. } => output,
        ExecutionResult::Revert { output } => return Err(Revert::new(output).into()),
        ExecutionResult::Halt { reason } => return Err(ClientError::Halted(reason)),
    };
    Ok(C::abi_decode_returns(&output, true)?)
}

fn view<C: SolCall>(host: &mut Host, to: Address, call: &C) -> Result<C::Return, ClientError> {
    let output = host.view(Address::ZERO, to, call.abi_encode().into())?;
    Ok(C::abi_decode_returns(&output, true)?)
}

/// A smart account deployed at a known address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::From)]
#[display("{address}")]
pub struct AccountHandle {
    address: Address,
}

impl AccountHandle {
    /// Wraps the account at `address`.
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// Returns the account's address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Returns the current owner, or [`Address::ZERO`] if the account is not initialized.
    pub fn owner(&self, host: &mut Host) -> Result<Address, ClientError> {
        Ok(view(host, self.address, &ISmartAccount::ownerCall {})?._0)
    }

    /// Returns the entry point the account trusts.
    pub fn entry_point(&self, host: &mut Host) -> Result<Address, ClientError> {
        Ok(view(host, self.address, &ISmartAccount::entryPointCall {})?._0)
    }

    /// Returns `true` if `module` is installed.
    pub fn is_module_installed(
        &self,
        host: &mut Host,
        module: Address,
    ) -> Result<bool, ClientError> {
        Ok(view(host, self.address, &ISmartAccount::isModuleInstalledCall { module })?._0)
    }

    /// Sets the first owner.
    pub fn initialize(
        &self,
        host: &mut Host,
        caller: Address,
        owner: Address,
    ) -> Result<(), ClientError> {
        transact(host, caller, self.address, U256::ZERO, &ISmartAccount::initializeCall { owner })?;
        Ok(())
    }

    /// Validates `user_op` as the entry point would, returning the validation code.
    ///
    /// Fails with [`ClientError::UnexpectedValidationData`] if the code at the address returns
    /// anything other than 0 or 1.
    pub fn validate_user_op(
        &self,
        host: &mut Host,
        caller: Address,
        user_op: PackedUserOperation,
        user_op_hash: B256,
        missing_account_funds: U256,
    ) -> Result<ValidationCode, ClientError> {
        let call = ISmartAccount::validateUserOpCall {
            userOp: user_op,
            userOpHash: user_op_hash,
            missingAccountFunds: missing_account_funds,
        };
        let data = transact(host, caller, self.address, U256::ZERO, &call)?.validationData;
        ValidationCode::from_u256(data).ok_or(ClientError::UnexpectedValidationData(data))
    }

    /// Makes the account call `target` and returns the callee's output.
    pub fn execute(
        &self,
        host: &mut Host,
        caller: Address,
        target: Address,
        value: U256,
        data: Bytes,
    ) -> Result<Bytes, ClientError> {
        let call = ISmartAccount::executeCall { target, value, data };
        Ok(transact(host, caller, self.address, U256::ZERO, &call)?.result)
    }

    /// Makes the account perform the calls `targets[i]` with `values[i]` and `datas[i]`
    /// atomically.
    pub fn execute_batch(
        &self,
        host: &mut Host,
        caller: Address,
        targets: Vec<Address>,
        values: Vec<U256>,
        datas: Vec<Bytes>,
    ) -> Result<(), ClientError> {
        let call = ISmartAccount::executeBatchCall { targets, values, datas };
        transact(host, caller, self.address, U256::ZERO, &call)?;
        Ok(())
    }

    /// Hands the account over to `new_owner`.
    pub fn transfer_ownership(
        &self,
        host: &mut Host,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), ClientError> {
        let call = ISmartAccount::transferOwnershipCall { newOwner: new_owner };
        transact(host, caller, self.address, U256::ZERO, &call)?;
        Ok(())
    }

    /// Installs `module`, passing `data` to its `onInstall` hook.
    pub fn install_module(
        &self,
        host: &mut Host,
        caller: Address,
        module: Address,
        data: Bytes,
    ) -> Result<(), ClientError> {
        let call = ISmartAccount::installModuleCall { module, data };
        transact(host, caller, self.address, U256::ZERO, &call)?;
        Ok(())
    }

    /// Uninstalls `module`, passing `data` to its `onUninstall` hook.
    pub fn uninstall_module(
        &self,
        host: &mut Host,
        caller: Address,
        module: Address,
        data: Bytes,
    ) -> Result<(), ClientError> {
        let call = ISmartAccount::uninstallModuleCall { module, data };
        transact(host, caller, self.address, U256::ZERO, &call)?;
        Ok(())
    }
}

/// An account factory deployed at a known address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::From)]
#[display("{address}")]
pub struct FactoryHandle {
    address: Address,
}

impl FactoryHandle {
    /// Wraps the factory at `address`.
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// Returns the factory's address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Deploys (or returns the already deployed) account for `(owner, salt)`.
    pub fn create_account(
        &self,
        host: &mut Host,
        caller: Address,
        owner: Address,
        salt: B256,
    ) -> Result<AccountHandle, ClientError> {
        let call = IAccountFactory::createAccountCall { owner, salt };
        Ok(transact(host, caller, self.address, U256::ZERO, &call)?.account.into())
    }

    /// Predicts the address [`Self::create_account`] deploys to.
    pub fn get_address(
        &self,
        host: &mut Host,
        owner: Address,
        salt: B256,
    ) -> Result<Address, ClientError> {
        Ok(view(host, self.address, &IAccountFactory::getAddressCall { owner, salt })?.account)
    }

    /// Returns the implementation accounts delegate to.
    pub fn account_implementation(&self, host: &mut Host) -> Result<Address, ClientError> {
        Ok(view(host, self.address, &IAccountFactory::accountImplementationCall {})?._0)
    }

    /// Returns the entry point accounts are initialized with.
    pub fn entry_point(&self, host: &mut Host) -> Result<Address, ClientError> {
        Ok(view(host, self.address, &IAccountFactory::entryPointCall {})?._0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{deploy_factory, AccountError, CallResult, Code, Frame, Program};
    use alloy_primitives::address;
    use revm::context::result::HaltReason;

    /// Answers every call with `validationData = 2`.
    #[derive(Debug)]
    struct TimeRangeValidator;

    impl Program for TimeRangeValidator {
        fn run(&self, _host: &mut Host, _frame: &Frame) -> CallResult {
            Ok(ISmartAccount::validateUserOpCall::abi_encode_returns(&(U256::from(2),)).into())
        }
    }

    const DEPLOYER: Address = address!("00000000000000000000000000000000000000d0");
    const ENTRY_POINT: Address = address!("0000000071727De22E5E9d8BAf0edAc6f37da032");
    const OWNER: Address = address!("00000000000000000000000000000000000a11ce");

    #[test]
    fn test_factory_getters() {
        let mut host = Host::default();
        let deployment = deploy_factory(&mut host, DEPLOYER, ENTRY_POINT).unwrap();
        let factory = FactoryHandle::new(deployment.factory);
        assert_eq!(factory.entry_point(&mut host).unwrap(), ENTRY_POINT);
        assert_eq!(
            factory.account_implementation(&mut host).unwrap(),
            deployment.account_implementation
        );
    }

    #[test]
    fn test_account_getters_and_errors() {
        let mut host = Host::default();
        let deployment = deploy_factory(&mut host, DEPLOYER, ENTRY_POINT).unwrap();
        let factory = FactoryHandle::new(deployment.factory);
        let account = factory.create_account(&mut host, OWNER, OWNER, B256::ZERO).unwrap();

        assert_eq!(account.to_string(), account.address().to_string());
        assert_eq!(account.owner(&mut host).unwrap(), OWNER);
        assert_eq!(account.entry_point(&mut host).unwrap(), ENTRY_POINT);

        let error = account.initialize(&mut host, OWNER, OWNER).unwrap_err();
        assert_eq!(error.account_error(), Some(&AccountError::AlreadyInitialized));
    }

    #[test]
    fn test_unexpected_validation_data_is_an_error() {
        let at = address!("0000000000000000000000000000000000000a0a");
        let mut host =
            Host::default().with_code(at, Code::native("TimeRangeValidator", TimeRangeValidator));
        let error = AccountHandle::new(at)
            .validate_user_op(
                &mut host,
                ENTRY_POINT,
                PackedUserOperation::default(),
                B256::ZERO,
                U256::ZERO,
            )
            .unwrap_err();
        assert!(matches!(
            error,
            ClientError::UnexpectedValidationData(data) if data == U256::from(2)
        ));
        assert_eq!(error.account_error(), None);
    }

    #[test]
    fn test_halted_transaction_is_an_error() {
        let exhausted = address!("00000000000000000000000000000000000000ff");
        let mut host = Host::default();
        host.set_nonce(exhausted, u64::MAX);
        let error = AccountHandle::new(OWNER).initialize(&mut host, exhausted, OWNER).unwrap_err();
        assert!(matches!(error, ClientError::Halted(HaltReason::NonceOverflow)));
    }
}
