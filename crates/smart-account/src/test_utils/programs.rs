use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall, SolError, SolInterface};

use crate::{CallResult, Code, Frame, Host, Program, Revert};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface ICounter {
        function increment() external payable;
        function setNumber(uint256 number) external;
        function number() external view returns (uint256);
        function fail() external;
    }
}

/// A counter contract keeping its number in slot 0. `fail()` reverts with
/// `Error("counter failure")`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Counter;

impl Counter {
    /// Revert reason of `fail()`.
    pub const FAILURE: &'static str = "counter failure";

    /// Wraps the counter into deployable code.
    pub fn into_code(self) -> Code {
        Code::native("Counter", self)
    }

    /// Reads the number stored by the counter at `address`.
    pub fn number(host: &mut Host, address: Address) -> U256 {
        host.sload(address, U256::ZERO)
    }

    /// The revert payload of `fail()`.
    pub fn failure() -> Bytes {
        alloy_sol_types::Revert { reason: Self::FAILURE.into() }.abi_encode().into()
    }
}

impl Program for Counter {
    fn run(&self, host: &mut Host, frame: &Frame) -> CallResult {
        if frame.input.is_empty() {
            return Ok(Bytes::new());
        }
        let Ok(call) = ICounter::ICounterCalls::abi_decode(&frame.input, true) else {
            return Err(Revert::empty());
        };
        let number = host.sload(frame.address, U256::ZERO);
        match call {
            ICounter::ICounterCalls::increment(_) => {
                host.sstore(frame.address, U256::ZERO, number + U256::from(1));
                Ok(Bytes::new())
            }
            ICounter::ICounterCalls::setNumber(call) => {
                host.sstore(frame.address, U256::ZERO, call.number);
                Ok(Bytes::new())
            }
            ICounter::ICounterCalls::number(_) => {
                Ok(ICounter::numberCall::abi_encode_returns(&(number,)).into())
            }
            ICounter::ICounterCalls::fail(_) => Err(Revert::new(Self::failure())),
        }
    }
}

/// A contract that rejects every call, including plain value transfers, with an empty payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectEther;

impl RejectEther {
    /// Wraps the contract into deployable code.
    pub fn into_code(self) -> Code {
        Code::native("RejectEther", self)
    }
}

impl Program for RejectEther {
    fn run(&self, _host: &mut Host, _frame: &Frame) -> CallResult {
        Err(Revert::empty())
    }
}

/// A contract that counts its own depth in slot 0 and calls itself with its input until the host
/// refuses the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfCaller;

impl SelfCaller {
    /// Wraps the contract into deployable code.
    pub fn into_code(self) -> Code {
        Code::native("SelfCaller", self)
    }
}

impl Program for SelfCaller {
    fn run(&self, host: &mut Host, frame: &Frame) -> CallResult {
        let depth = host.sload(frame.address, U256::ZERO);
        host.sstore(frame.address, U256::ZERO, depth + U256::from(1));
        host.call(frame.address, frame.address, U256::ZERO, frame.input.clone())
    }
}
