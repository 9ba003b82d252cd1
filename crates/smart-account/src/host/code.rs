use core::fmt::Debug;
use std::sync::Arc;

use alloy_primitives::{keccak256, Bytes, B256};
use auto_impl::auto_impl;
use revm::state::Bytecode;

use crate::{CallResult, Frame, Host};

/// Prefix of the stored bytecode of natively executed programs. `0xfe` is the `INVALID` opcode,
/// so such code halts immediately if it is ever interpreted as EVM bytecode.
pub const NATIVE_CODE_PREFIX: u8 = 0xfe;

/// Executable behavior attached to an address.
///
/// A program is invoked with the [`Host`] it runs in and the [`Frame`] describing the call. It
/// may read and write the storage of `frame.address`, emit logs and perform nested calls. Any
/// state changes it makes are rolled back by the host if it returns an error.
#[auto_impl(&, Box, Arc)]
pub trait Program: Debug + Send + Sync {
    /// Executes a call frame.
    fn run(&self, host: &mut Host, frame: &Frame) -> CallResult;
}

/// The code deployed at an address: the stored bytecode and the program executing it.
///
/// Only the bytecode enters the ledger state; the host keeps the program next to it and runs it
/// while the account's code hash equals [`Self::hash`].
#[derive(Debug, Clone)]
pub struct Code {
    bytecode: Bytes,
    hash: B256,
    program: Arc<dyn Program>,
}

impl Code {
    /// Creates code with explicit bytecode.
    pub fn new(bytecode: Bytes, program: impl Program + 'static) -> Self {
        let hash = keccak256(&bytecode);
        Self { bytecode, hash, program: Arc::new(program) }
    }

    /// Creates code for a natively executed program. The stored bytecode is
    /// [`NATIVE_CODE_PREFIX`] followed by `name`.
    pub fn native(name: &str, program: impl Program + 'static) -> Self {
        let mut bytecode = Vec::with_capacity(name.len() + 1);
        bytecode.push(NATIVE_CODE_PREFIX);
        bytecode.extend_from_slice(name.as_bytes());
        Self::new(bytecode.into(), program)
    }

    /// Returns the stored bytecode.
    pub const fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Returns the keccak hash of the stored bytecode.
    pub const fn hash(&self) -> B256 {
        self.hash
    }

    /// Returns `true` if the code is natively executed rather than real EVM bytecode.
    pub fn is_native(&self) -> bool {
        self.bytecode.first() == Some(&NATIVE_CODE_PREFIX)
    }

    /// Returns the bytecode as stored in the journal.
    pub fn to_bytecode(&self) -> Bytecode {
        Bytecode::new_legacy(self.bytecode.clone())
    }

    pub(crate) fn program(&self) -> Arc<dyn Program> {
        Arc::clone(&self.program)
    }
}
