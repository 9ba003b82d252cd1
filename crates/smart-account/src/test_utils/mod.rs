//! Test utilities for the smart account.

mod env;
mod modules;
mod programs;
mod signer;

pub use env::*;
pub use modules::*;
pub use programs::*;
pub use signer::*;
