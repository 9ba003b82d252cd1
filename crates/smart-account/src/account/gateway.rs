use alloy_primitives::{Address, Bytes, B256, U256};
use smart_account_contracts::ISmartAccount;
use tracing::debug;

use super::{signature, storage, SmartAccount};
use crate::{AccountError, Frame, Host, PackedUserOperation, ValidationCode};

impl SmartAccount {
    pub(super) fn require_from_entry_point(&self, frame: &Frame) -> Result<(), AccountError> {
        if frame.caller != self.entry_point {
            return Err(AccountError::Unauthorized);
        }
        Ok(())
    }

    pub(super) fn require_from_entry_point_or_owner(
        &self,
        host: &mut Host,
        frame: &Frame,
    ) -> Result<(), AccountError> {
        if frame.caller == self.entry_point || is_owner(host, frame) {
            return Ok(());
        }
        Err(AccountError::Unauthorized)
    }

    /// Modules may additionally be managed by the account itself, i.e. through `execute`.
    pub(super) fn require_module_manager(
        &self,
        host: &mut Host,
        frame: &Frame,
    ) -> Result<(), AccountError> {
        if frame.caller == frame.address {
            return Ok(());
        }
        self.require_from_entry_point_or_owner(host, frame)
    }

    pub(super) fn initialize(
        &self,
        host: &mut Host,
        frame: &Frame,
        owner: Address,
    ) -> Result<(), AccountError> {
        if !storage::owner(host, frame.address).is_zero() {
            return Err(AccountError::AlreadyInitialized);
        }
        if owner.is_zero() {
            return Err(AccountError::InvalidOwner);
        }

        storage::set_owner(host, frame.address, owner);
        host.emit_event(
            frame.address,
            &ISmartAccount::AccountInitialized { entryPoint: self.entry_point, owner },
        );
        debug!(
            target: "smart_account::account",
            account = %frame.address,
            %owner,
            "account initialized"
        );
        Ok(())
    }

    /// Authenticates an operation on behalf of the entry point.
    ///
    /// A signature that does not belong to the owner is reported through the returned code, never
    /// as an error. The only failures are a foreign caller and a failed reimbursement of
    /// `missing_funds` to the entry point.
    pub(super) fn validate_user_op(
        &self,
        host: &mut Host,
        frame: &Frame,
        user_op: &PackedUserOperation,
        user_op_hash: B256,
        missing_funds: U256,
    ) -> Result<ValidationCode, AccountError> {
        self.require_from_entry_point(frame)?;

        let owner = storage::owner(host, frame.address);
        let code = signature::validate_signature(owner, user_op_hash, &user_op.signature);
        debug!(
            target: "smart_account::account",
            account = %frame.address,
            %user_op_hash,
            ?code,
            "user operation validated"
        );

        if !missing_funds.is_zero() {
            host.call(frame.address, frame.caller, missing_funds, Bytes::new()).map_err(|_| {
                debug!(
                    target: "smart_account::account",
                    account = %frame.address,
                    %missing_funds,
                    "prefund failed"
                );
                AccountError::PaymentFailed
            })?;
        }
        Ok(code)
    }

    pub(super) fn execute(
        &self,
        host: &mut Host,
        frame: &Frame,
        target: Address,
        value: U256,
        data: Bytes,
    ) -> Result<Bytes, AccountError> {
        self.require_from_entry_point_or_owner(host, frame)?;
        host.call(frame.address, target, value, data)
            .map_err(|revert| AccountError::CallReverted(revert.output))
    }

    /// Executes the calls in order. The first failure aborts the batch with the callee's revert
    /// payload; the host then rolls back the calls that already ran.
    pub(super) fn execute_batch(
        &self,
        host: &mut Host,
        frame: &Frame,
        targets: Vec<Address>,
        values: Vec<U256>,
        datas: Vec<Bytes>,
    ) -> Result<(), AccountError> {
        self.require_from_entry_point_or_owner(host, frame)?;
        if targets.len() != values.len() || targets.len() != datas.len() {
            return Err(AccountError::LengthMismatch);
        }

        let calls = targets.into_iter().zip(values).zip(datas);
        for (index, ((target, value), data)) in calls.enumerate() {
            host.call(frame.address, target, value, data).map_err(|revert| {
                debug!(
                    target: "smart_account::account",
                    account = %frame.address,
                    index,
                    %target,
                    "batch call reverted"
                );
                AccountError::CallReverted(revert.output)
            })?;
        }
        Ok(())
    }

    pub(super) fn transfer_ownership(
        &self,
        host: &mut Host,
        frame: &Frame,
        new_owner: Address,
    ) -> Result<(), AccountError> {
        if !is_owner(host, frame) {
            return Err(AccountError::Unauthorized);
        }
        let previous_owner = storage::owner(host, frame.address);
        if new_owner.is_zero() {
            return Err(AccountError::InvalidOwner);
        }

        storage::set_owner(host, frame.address, new_owner);
        host.emit_event(
            frame.address,
            &ISmartAccount::OwnershipTransferred {
                previousOwner: previous_owner,
                newOwner: new_owner,
            },
        );
        debug!(
            target: "smart_account::account",
            account = %frame.address,
            %previous_owner,
            %new_owner,
            "ownership transferred"
        );
        Ok(())
    }
}

/// An uninitialized account has no owner; the zero address never qualifies.
fn is_owner(host: &mut Host, frame: &Frame) -> bool {
    let owner = storage::owner(host, frame.address);
    !owner.is_zero() && frame.caller == owner
}
