//! Solidity-compatible storage layout of the account.
//!
//! | slot                             | content                          |
//! |----------------------------------|----------------------------------|
//! | `0`                              | `address owner`                  |
//! | `keccak256(abi.encode(module, 1))` | `installed[module]` (`bool`)   |

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::{constants::slots, Host};

/// Returns the slot of `installed[module]`.
pub fn module_slot(module: Address) -> U256 {
    let mut preimage = [0u8; 64];
    preimage[12..32].copy_from_slice(module.as_slice());
    preimage[32..].copy_from_slice(&slots::INSTALLED_MODULES.to_be_bytes::<32>());
    U256::from_be_bytes(keccak256(preimage).0)
}

/// Reads the owner of `account`.
pub fn owner(host: &mut Host, account: Address) -> Address {
    let word = B256::from(host.sload(account, slots::OWNER).to_be_bytes::<32>());
    Address::from_word(word)
}

pub(crate) fn set_owner(host: &mut Host, account: Address, owner: Address) {
    host.sstore(account, slots::OWNER, U256::from_be_bytes(owner.into_word().0));
}

/// Returns `true` if `module` is installed on `account`.
pub fn is_installed(host: &mut Host, account: Address, module: Address) -> bool {
    !host.sload(account, module_slot(module)).is_zero()
}

pub(crate) fn set_installed(host: &mut Host, account: Address, module: Address, installed: bool) {
    host.sstore(account, module_slot(module), U256::from(u8::from(installed)));
}
