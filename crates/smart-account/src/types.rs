use alloy_primitives::U256;

pub use smart_account_contracts::PackedUserOperation;

/// The capability classes a module can report membership of.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ModuleType {
    /// Validates operations.
    Validator = 1,
    /// Executes calls on behalf of the account.
    Executor = 2,
    /// Handles calls the account does not implement.
    Fallback = 3,
    /// Runs checks before and after execution.
    Hook = 4,
}

impl ModuleType {
    /// All module types, in identifier order.
    pub const ALL: [Self; 4] = [Self::Validator, Self::Executor, Self::Fallback, Self::Hook];

    /// Returns the on-chain type identifier.
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Returns the module type with the given identifier.
    pub fn from_id(id: U256) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| U256::from(ty.id()) == id)
    }
}

impl From<ModuleType> for U256 {
    fn from(ty: ModuleType) -> Self {
        Self::from(ty.id())
    }
}

/// The outcome of signature validation, as returned by `validateUserOp`.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ValidationCode {
    /// The signature belongs to the owner (code 0).
    Success,
    /// The signature does not belong to the owner (code 1).
    Failed,
}

impl ValidationCode {
    /// Returns the ABI value of the code.
    pub const fn to_u256(self) -> U256 {
        match self {
            Self::Success => crate::constants::SIG_VALIDATION_SUCCESS,
            Self::Failed => crate::constants::SIG_VALIDATION_FAILED,
        }
    }

    /// Parses a `validateUserOp` return value. Any value other than 0 or 1 yields `None`.
    pub fn from_u256(value: U256) -> Option<Self> {
        if value == crate::constants::SIG_VALIDATION_SUCCESS {
            Some(Self::Success)
        } else if value == crate::constants::SIG_VALIDATION_FAILED {
            Some(Self::Failed)
        } else {
            None
        }
    }
}
