//! The deterministic account factory.
//!
//! Accounts are EIP-1167 clones of a single [`SmartAccount`] implementation, deployed with
//! CREATE2 from the factory. The address of an account is therefore
//!
//! ```text
//! keccak256(0xff ++ factory ++ salt ++ keccak256(proxy_init_code(implementation)))[12..]
//! ```
//!
//! and can be computed before deployment with [`AccountFactory::get_address`]. The owner is not
//! part of the derivation: it is only applied by the `initialize` call right after deployment.
//! Two owners asking for the same salt compete for the same address, and whoever deploys first
//! owns it.

mod proxy;

pub use proxy::*;

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolInterface};
use smart_account_contracts::{
    minimal_proxy,
    IAccountFactory::{self, IAccountFactoryCalls},
    ISmartAccount,
};
use tracing::debug;

use crate::{CallResult, Code, FactoryConfig, Frame, Host, Program, Revert, SmartAccount};

/// Name under which the factory is stored as native code.
pub const FACTORY_CODE_NAME: &str = "AccountFactory";

/// The factory program. Both fields are fixed at deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountFactory {
    entry_point: Address,
    account_implementation: Address,
}

/// Addresses produced by [`deploy_factory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactoryDeployment {
    /// The factory.
    pub factory: Address,
    /// The account implementation the factory clones.
    pub account_implementation: Address,
}

impl AccountFactory {
    /// Creates a factory cloning `account_implementation`, whose accounts trust `entry_point`.
    pub const fn new(entry_point: Address, account_implementation: Address) -> Self {
        Self { entry_point, account_implementation }
    }

    /// Returns the entry point forwarded to every account.
    pub const fn entry_point(&self) -> Address {
        self.entry_point
    }

    /// Returns the implementation every account delegates to.
    pub const fn account_implementation(&self) -> Address {
        self.account_implementation
    }

    /// Wraps the factory into deployable code.
    pub fn into_code(self) -> Code {
        Code::native(FACTORY_CODE_NAME, self)
    }

    /// Computes the address of the account the factory at `factory` deploys for `salt`.
    ///
    /// `_owner` does not take part in the derivation; it is accepted for symmetry with
    /// [`Self::create_account`].
    pub fn get_address(&self, factory: Address, _owner: Address, salt: B256) -> Address {
        factory.create2(salt, minimal_proxy::init_code_hash(self.account_implementation))
    }

    /// Deploys the account for `(owner, salt)` and initializes it with `owner`.
    ///
    /// If the address already holds code it is returned as is, without initializing again.
    pub fn create_account(
        &self,
        host: &mut Host,
        factory: Address,
        owner: Address,
        salt: B256,
    ) -> Result<Address, Revert> {
        let predicted = self.get_address(factory, owner, salt);
        if host.has_code(predicted) {
            debug!(
                target: "smart_account::factory",
                account = %predicted,
                "account already deployed"
            );
            return Ok(predicted);
        }

        let account = host.create2(
            factory,
            salt,
            &minimal_proxy::init_code(self.account_implementation),
            MinimalProxy::new(self.account_implementation).into_code(),
        )?;
        debug_assert_eq!(account, predicted);

        let initialize = ISmartAccount::initializeCall { owner }.abi_encode();
        host.call(factory, account, U256::ZERO, initialize.into())?;

        host.emit_event(factory, &IAccountFactory::AccountCreated { account, owner, salt });
        debug!(target: "smart_account::factory", %account, %owner, %salt, "account created");
        Ok(account)
    }
}

impl Program for AccountFactory {
    fn run(&self, host: &mut Host, frame: &Frame) -> CallResult {
        let Ok(call) = IAccountFactoryCalls::abi_decode(&frame.input, true) else {
            return Err(Revert::empty());
        };
        let output: Bytes = match call {
            IAccountFactoryCalls::createAccount(call) => {
                let account = self.create_account(host, frame.address, call.owner, call.salt)?;
                IAccountFactory::createAccountCall::abi_encode_returns(&(account,)).into()
            }
            IAccountFactoryCalls::getAddress(call) => {
                let account = self.get_address(frame.address, call.owner, call.salt);
                IAccountFactory::getAddressCall::abi_encode_returns(&(account,)).into()
            }
            IAccountFactoryCalls::accountImplementation(_) => {
                IAccountFactory::accountImplementationCall::abi_encode_returns(&(
                    self.account_implementation,
                ))
                .into()
            }
            IAccountFactoryCalls::entryPoint(_) => {
                IAccountFactory::entryPointCall::abi_encode_returns(&(self.entry_point,)).into()
            }
        };
        Ok(output)
    }
}

/// Deploys a factory from `deployer` with CREATE. As its constructor would, the factory deploys
/// the account implementation with CREATE from its own address (at nonce 1).
///
/// The deployment is one atomic transaction.
pub fn deploy_factory(
    host: &mut Host,
    deployer: Address,
    entry_point: Address,
) -> Result<FactoryDeployment, Revert> {
    host.transact_with(|host| {
        let factory = deployer.create(host.nonce(deployer));
        // A fresh contract's nonce is 1, so its first CREATE uses nonce 1.
        let account_implementation = factory.create(1);

        let factory_code = AccountFactory::new(entry_point, account_implementation).into_code();
        let deployed = host.create(deployer, factory_code)?;
        debug_assert_eq!(deployed, factory);
        let deployed = host.create(factory, SmartAccount::new(entry_point).into_code())?;
        debug_assert_eq!(deployed, account_implementation);

        debug!(
            target: "smart_account::factory",
            %factory,
            %account_implementation,
            %entry_point,
            "factory deployed"
        );
        Ok(FactoryDeployment { factory, account_implementation })
    })
}

/// Deploys a factory with the parameters of `config`.
pub fn deploy_factory_with_config(
    host: &mut Host,
    config: &FactoryConfig,
) -> Result<FactoryDeployment, Revert> {
    deploy_factory(host, config.deployer, config.entry_point)
}
