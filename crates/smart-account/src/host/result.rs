use alloy_primitives::{Address, Bytes, Log, U256};
use alloy_sol_types::{SolError, SolInterface};
use revm::context::result::HaltReason;

/// The outcome of a call frame: the returned data, or the raw revert payload.
pub type CallResult = Result<Bytes, Revert>;

/// A reverted call carrying the callee's revert payload unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("execution reverted: {output:?}")]
pub struct Revert {
    /// The raw revert payload.
    pub output: Bytes,
}

impl Revert {
    /// Creates a revert with the given payload.
    pub fn new(output: impl Into<Bytes>) -> Self {
        Self { output: output.into() }
    }

    /// Creates a revert with an empty payload.
    pub const fn empty() -> Self {
        Self { output: Bytes::new() }
    }

    /// Creates a revert carrying an ABI-encoded Solidity error.
    pub fn from_error<E: SolError>(error: &E) -> Self {
        Self::new(error.abi_encode())
    }

    /// Decodes the payload as one of the errors of a Solidity interface.
    pub fn decode<E: SolInterface>(&self) -> Option<E> {
        E::abi_decode(&self.output, true).ok()
    }
}

/// The call context of a running program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The immediate caller (`msg.sender`).
    pub caller: Address,
    /// The address whose storage and balance the frame operates on (`address(this)`).
    pub address: Address,
    /// The address the executing code was loaded from. Differs from `address` under delegate
    /// calls.
    pub code_address: Address,
    /// The value transferred with the call (`msg.value`).
    pub value: U256,
    /// The calldata.
    pub input: Bytes,
    /// The call depth, starting at 1 for the transaction's outermost frame.
    pub depth: usize,
}

/// A top-level transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxEnv {
    /// The sender.
    pub caller: Address,
    /// The called address.
    pub to: Address,
    /// The value transferred to `to`.
    pub value: U256,
    /// The calldata.
    pub data: Bytes,
}

/// The result of a top-level transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// The transaction succeeded and its state changes were committed.
    Success {
        /// The data returned by the called address.
        output: Bytes,
        /// The logs emitted during the transaction.
        logs: Vec<Log>,
    },
    /// The transaction reverted and all its state changes were rolled back.
    Revert {
        /// The revert payload.
        output: Bytes,
    },
    /// The transaction could not run at all and left the state untouched.
    Halt {
        /// Why the transaction halted.
        reason: HaltReason,
    },
}

static EMPTY_OUTPUT: Bytes = Bytes::new();

impl ExecutionResult {
    /// Returns `true` if the transaction succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the returned data or revert payload. Halted transactions have none.
    pub fn output(&self) -> &Bytes {
        match self {
            Self::Success { output, .. } | Self::Revert { output } => output,
            Self::Halt { .. } => &EMPTY_OUTPUT,
        }
    }

    /// Returns the emitted logs. Reverted and halted transactions emit none.
    pub fn logs(&self) -> &[Log] {
        match self {
            Self::Success { logs, .. } => logs,
            Self::Revert { .. } | Self::Halt { .. } => &[],
        }
    }

    /// Converts the result into the returned data or a [`Revert`]. A halt becomes an empty
    /// revert.
    pub fn into_result(self) -> CallResult {
        match self {
            Self::Success { output, .. } => Ok(output),
            Self::Revert { output } => Err(Revert { output }),
            Self::Halt { .. } => Err(Revert::empty()),
        }
    }
}
