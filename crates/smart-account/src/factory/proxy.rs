use alloy_primitives::Address;
use smart_account_contracts::minimal_proxy;

use crate::{CallResult, Code, Frame, Host, Program};

/// An EIP-1167 clone: forwards every call to the implementation with `DELEGATECALL`, keeping
/// the caller, the value and the calldata, and returns or reverts with the implementation's
/// output unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimalProxy {
    implementation: Address,
}

impl MinimalProxy {
    /// Creates a proxy forwarding to `implementation`.
    pub const fn new(implementation: Address) -> Self {
        Self { implementation }
    }

    /// Returns the implementation calls are forwarded to.
    pub const fn implementation(&self) -> Address {
        self.implementation
    }

    /// Wraps the proxy into code whose bytecode is the standard 45-byte runtime code.
    pub fn into_code(self) -> Code {
        Code::new(minimal_proxy::runtime_code(self.implementation), self)
    }
}

impl Program for MinimalProxy {
    fn run(&self, host: &mut Host, frame: &Frame) -> CallResult {
        host.delegate_call(frame, self.implementation, frame.input.clone())
    }
}
