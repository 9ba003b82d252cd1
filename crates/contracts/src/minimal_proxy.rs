//! EIP-1167 minimal proxy templates.
//!
//! The runtime code copies the calldata, delegate-calls the embedded implementation and returns
//! or reverts with whatever the implementation produced:
//!
//! ```text
//! 363d3d373d3d3d363d73 <implementation: 20 bytes> 5af43d82803e903d91602b57fd5bf3
//! ```
//!
//! The creation code is the 10-byte deployer `3d602d80600a3d3981f3` followed by the runtime code.
//! CREATE2 addresses of clones are derived from the keccak hash of the creation code, so these
//! bytes must never change.

use alloc::vec::Vec;

use alloy_primitives::{hex, keccak256, Address, Bytes, B256};

/// Runtime bytes preceding the implementation address (ends with `PUSH20`).
pub const RUNTIME_PREFIX: [u8; 10] = hex!("363d3d373d3d3d363d73");

/// Runtime bytes following the implementation address.
pub const RUNTIME_SUFFIX: [u8; 15] = hex!("5af43d82803e903d91602b57fd5bf3");

/// Creation bytes that return the 45-byte runtime code.
pub const CREATION_PREFIX: [u8; 10] = hex!("3d602d80600a3d3981f3");

/// Length of the proxy runtime code.
pub const RUNTIME_CODE_LEN: usize = RUNTIME_PREFIX.len() + 20 + RUNTIME_SUFFIX.len();

/// Length of the proxy creation code.
pub const INIT_CODE_LEN: usize = CREATION_PREFIX.len() + RUNTIME_CODE_LEN;

/// Returns the runtime code of a proxy forwarding to `implementation`.
pub fn runtime_code(implementation: Address) -> Bytes {
    let mut code = Vec::with_capacity(RUNTIME_CODE_LEN);
    code.extend_from_slice(&RUNTIME_PREFIX);
    code.extend_from_slice(implementation.as_slice());
    code.extend_from_slice(&RUNTIME_SUFFIX);
    code.into()
}

/// Returns the creation code of a proxy forwarding to `implementation`.
pub fn init_code(implementation: Address) -> Bytes {
    let mut code = Vec::with_capacity(INIT_CODE_LEN);
    code.extend_from_slice(&CREATION_PREFIX);
    code.extend_from_slice(&runtime_code(implementation));
    code.into()
}

/// Returns the keccak hash of the creation code, the input to CREATE2 address derivation.
pub fn init_code_hash(implementation: Address) -> B256 {
    keccak256(init_code(implementation))
}

/// Extracts the implementation address from proxy runtime code, or `None` if `code` is not a
/// minimal proxy.
pub fn implementation_of(code: &[u8]) -> Option<Address> {
    if code.len() != RUNTIME_CODE_LEN ||
        code[..RUNTIME_PREFIX.len()] != RUNTIME_PREFIX ||
        code[RUNTIME_CODE_LEN - RUNTIME_SUFFIX.len()..] != RUNTIME_SUFFIX
    {
        return None;
    }
    Some(Address::from_slice(&code[RUNTIME_PREFIX.len()..RUNTIME_PREFIX.len() + 20]))
}
