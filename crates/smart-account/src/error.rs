use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolError;
use revm::context::result::HaltReason;
use smart_account_contracts::ISmartAccount::{self, ISmartAccountErrors};

use crate::Revert;

/// Errors raised by the smart account.
///
/// Every variant maps to a custom error of `ISmartAccount`, except [`Self::CallReverted`], which
/// carries the revert payload of a failed outbound call unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    /// The caller is not allowed to invoke the function.
    #[error("caller is not authorized")]
    Unauthorized,
    /// The account already has an owner.
    #[error("account is already initialized")]
    AlreadyInitialized,
    /// The zero address cannot own an account.
    #[error("invalid owner")]
    InvalidOwner,
    /// The batch arrays differ in length.
    #[error("batch length mismatch")]
    LengthMismatch,
    /// Reimbursing the entry point failed.
    #[error("prefund payment failed")]
    PaymentFailed,
    /// The module is already installed.
    #[error("module {0} is already installed")]
    AlreadyInstalled(Address),
    /// The module is not installed.
    #[error("module {0} is not installed")]
    NotInstalled(Address),
    /// An outbound call failed. The payload is the callee's, untouched.
    #[error("call reverted: {0:?}")]
    CallReverted(Bytes),
}

impl AccountError {
    /// Decodes a revert payload produced by an account. Payloads that are not account errors,
    /// such as those propagated from failed outbound calls, become [`Self::CallReverted`].
    pub fn decode(revert: &Revert) -> Self {
        match revert.decode::<ISmartAccountErrors>() {
            Some(ISmartAccountErrors::Unauthorized(_)) => Self::Unauthorized,
            Some(ISmartAccountErrors::AlreadyInitialized(_)) => Self::AlreadyInitialized,
            Some(ISmartAccountErrors::InvalidOwner(_)) => Self::InvalidOwner,
            Some(ISmartAccountErrors::LengthMismatch(_)) => Self::LengthMismatch,
            Some(ISmartAccountErrors::PaymentFailed(_)) => Self::PaymentFailed,
            Some(ISmartAccountErrors::AlreadyInstalled(error)) => {
                Self::AlreadyInstalled(error.module)
            }
            Some(ISmartAccountErrors::NotInstalled(error)) => Self::NotInstalled(error.module),
            None => Self::CallReverted(revert.output.clone()),
        }
    }

    /// Encodes the error as revert data.
    pub fn encode(&self) -> Bytes {
        match self {
            Self::Unauthorized => ISmartAccount::Unauthorized {}.abi_encode().into(),
            Self::AlreadyInitialized => ISmartAccount::AlreadyInitialized {}.abi_encode().into(),
            Self::InvalidOwner => ISmartAccount::InvalidOwner {}.abi_encode().into(),
            Self::LengthMismatch => ISmartAccount::LengthMismatch {}.abi_encode().into(),
            Self::PaymentFailed => ISmartAccount::PaymentFailed {}.abi_encode().into(),
            Self::AlreadyInstalled(module) => {
                ISmartAccount::AlreadyInstalled { module: *module }.abi_encode().into()
            }
            Self::NotInstalled(module) => {
                ISmartAccount::NotInstalled { module: *module }.abi_encode().into()
            }
            Self::CallReverted(output) => output.clone(),
        }
    }
}

impl From<AccountError> for Revert {
    fn from(error: AccountError) -> Self {
        Self::new(error.encode())
    }
}

/// Errors returned by the typed call helpers ([`AccountHandle`](crate::AccountHandle),
/// [`FactoryHandle`](crate::FactoryHandle) and the module queries).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The call reverted.
    #[error(transparent)]
    Account(#[from] AccountError),
    /// The call succeeded but returned data that does not match the ABI.
    #[error("failed to decode return data: {0}")]
    Decode(#[from] alloy_sol_types::Error),
    /// `validateUserOp` returned a value that is not a validation code.
    #[error("unexpected validation data: {0}")]
    UnexpectedValidationData(U256),
    /// The transaction halted before reaching the callee.
    #[error("transaction halted: {0:?}")]
    Halted(HaltReason),
}

impl ClientError {
    /// Returns the account error if the call reverted.
    pub const fn account_error(&self) -> Option<&AccountError> {
        match self {
            Self::Account(error) => Some(error),
            _ => None,
        }
    }
}

impl From<Revert> for ClientError {
    fn from(revert: Revert) -> Self {
        Self::Account(AccountError::decode(&revert))
    }
}
