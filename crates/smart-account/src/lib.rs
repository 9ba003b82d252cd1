//! A signature-gated smart account with a module registry and a deterministic factory.
//!
//! The crate runs three programs on an in-process [`Host`] ledger:
//!
//! - [`SmartAccount`], the account implementation: it validates owner signatures for an entry
//!   point, executes single and batched calls, transfers ownership and manages modules
//! - [`AccountFactory`], which clones the implementation with EIP-1167 minimal proxies at
//!   CREATE2 addresses that can be predicted before deployment
//! - [`ModuleProgram`], which exposes any [`Module`] through the `IModule` ABI
//!
//! [`AccountHandle`] and [`FactoryHandle`] offer typed access to deployed programs.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub use smart_account_contracts as contracts;

pub mod constants;

mod account;
pub use account::*;

mod config;
pub use config::*;

mod error;
pub use error::*;

mod factory;
pub use factory::*;

mod handle;
pub use handle::*;

mod host;
pub use host::*;

mod module;
pub use module::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod types;
pub use types::*;
