//! Constants for the smart account.

use alloy_primitives::U256;

/// Default maximum call depth of the host.
///
/// Programs run natively and every nested frame recurses on the thread stack, so the EVM's 1024
/// frames would overflow a default 2 MiB thread before the limit is reached.
pub const MAX_CALL_DEPTH: usize = 128;

/// Returned by `validateUserOp` when the signature belongs to the owner.
pub const SIG_VALIDATION_SUCCESS: U256 = U256::ZERO;

/// Returned by `validateUserOp` when the signature does not belong to the owner.
pub const SIG_VALIDATION_FAILED: U256 = U256::from_limbs([1, 0, 0, 0]);

/// Length of an `r ++ s ++ v` ECDSA signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Storage layout of the account.
pub mod slots {
    use alloy_primitives::U256;

    /// Slot holding the owner address.
    pub const OWNER: U256 = U256::ZERO;

    /// Base slot of the `mapping(address => bool)` of installed modules.
    pub const INSTALLED_MODULES: U256 = U256::from_limbs([1, 0, 0, 0]);
}
