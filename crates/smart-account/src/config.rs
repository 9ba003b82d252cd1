use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_CALL_DEPTH;

/// Configuration of the [`Host`](crate::Host) ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostConfig {
    /// Maximum nesting of call frames. Calls beyond it revert with an empty payload.
    pub max_call_depth: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self { max_call_depth: MAX_CALL_DEPTH }
    }
}

/// Deployment parameters of an [`AccountFactory`](crate::AccountFactory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryConfig {
    /// The externally owned account deploying the factory.
    pub deployer: Address,
    /// The operation processor every account created by the factory trusts.
    pub entry_point: Address,
}
