use alloy_primitives::{address, Address, B256, U256};

use crate::{deploy_factory, AccountHandle, FactoryDeployment, FactoryHandle, Host, HostConfig};

use super::TestSigner;

/// The externally owned account deploying the factory.
pub const DEPLOYER: Address = address!("00000000000000000000000000000000000000d0");

/// The operation processor accounts trust.
pub const ENTRY_POINT: Address = address!("0000000071727De22E5E9d8BAf0edAc6f37da032");

/// Balance given to the entry point and the owner at genesis.
pub const INITIAL_BALANCE: u64 = 1_000_000_000_000_000_000;

/// A host with a deployed factory and a funded owner key.
#[derive(Debug)]
pub struct TestEnv {
    /// The ledger.
    pub host: Host,
    /// The deployed factory.
    pub factory: FactoryHandle,
    /// The implementation the factory clones.
    pub account_implementation: Address,
    /// The key owning accounts created with [`Self::create_account`].
    pub owner: TestSigner,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

impl TestEnv {
    /// Sets up a host with `config`, deploys the factory and funds the entry point and owner.
    pub fn new(config: HostConfig) -> Self {
        let owner = TestSigner::from_scalar(0xa11ce);
        let mut host = Host::new(config)
            .with_balance(ENTRY_POINT, U256::from(INITIAL_BALANCE))
            .with_balance(owner.address(), U256::from(INITIAL_BALANCE));
        let FactoryDeployment { factory, account_implementation } =
            deploy_factory(&mut host, DEPLOYER, ENTRY_POINT).expect("factory deployment failed");
        Self { host, factory: FactoryHandle::new(factory), account_implementation, owner }
    }

    /// Returns the owner's address.
    pub fn owner_address(&self) -> Address {
        self.owner.address()
    }

    /// Creates the owner's account for `salt` through the factory.
    pub fn create_account(&mut self, salt: B256) -> AccountHandle {
        let owner = self.owner.address();
        self.factory
            .create_account(&mut self.host, owner, owner, salt)
            .expect("account creation failed")
    }

    /// Creates the owner's account for `salt` and funds it with `balance`.
    pub fn create_funded_account(&mut self, salt: B256, balance: U256) -> AccountHandle {
        let account = self.create_account(salt);
        let current = self.host.balance(account.address());
        self.host.set_balance(account.address(), current + balance);
        account
    }
}
