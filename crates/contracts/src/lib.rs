//! Solidity interfaces for the smart account.
//!
//! This crate provides the ABI bindings shared by the account, its modules and the deterministic
//! factory, together with the EIP-1167 minimal-proxy byte templates the factory clones accounts
//! with. The bindings are generated with [`alloy_sol_types::sol!`].

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(unused_crate_dependencies)]
#![deny(unused_must_use)]

extern crate alloc;

pub use alloy_primitives;

use alloy_sol_types::sol;

pub mod minimal_proxy;

sol! {
    /// The user operation consumed by [`ISmartAccount::validateUserOpCall`]. Only `signature` is
    /// read by the account; the remaining fields belong to the operation processor.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct PackedUserOperation {
        address sender;
        uint256 nonce;
        bytes initCode;
        bytes callData;
        bytes32 accountGasLimits;
        uint256 preVerificationGas;
        bytes32 gasFees;
        bytes paymasterAndData;
        bytes signature;
    }

    /// The externally visible surface of a smart account.
    #[derive(Debug, PartialEq, Eq)]
    interface ISmartAccount {
        /// The caller is neither the owner, the entry point, nor the account itself.
        error Unauthorized();
        /// `initialize` was called on an account that already has an owner.
        error AlreadyInitialized();
        /// The zero address was supplied as owner.
        error InvalidOwner();
        /// The batch arrays are not of equal length.
        error LengthMismatch();
        /// Reimbursing the entry point failed.
        error PaymentFailed();
        /// The module is already installed.
        error AlreadyInstalled(address module);
        /// The module is not installed.
        error NotInstalled(address module);

        event AccountInitialized(address indexed entryPoint, address indexed owner);
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);
        event ModuleInstalled(address indexed module);
        event ModuleUninstalled(address indexed module);

        function initialize(address owner) external;
        function owner() external view returns (address);
        function entryPoint() external view returns (address);

        function validateUserOp(
            PackedUserOperation calldata userOp,
            bytes32 userOpHash,
            uint256 missingAccountFunds
        ) external returns (uint256 validationData);

        function execute(address target, uint256 value, bytes calldata data)
            external
            returns (bytes memory result);
        function executeBatch(
            address[] calldata targets,
            uint256[] calldata values,
            bytes[] calldata datas
        ) external;

        function transferOwnership(address newOwner) external;

        function installModule(address module, bytes calldata data) external;
        function uninstallModule(address module, bytes calldata data) external;
        function isModuleInstalled(address module) external view returns (bool);
    }

    /// Lifecycle hooks every module exposes to the accounts it is attached to.
    #[derive(Debug, PartialEq, Eq)]
    interface IModule {
        function onInstall(bytes calldata data) external;
        function onUninstall(bytes calldata data) external;
        function isModuleType(uint256 moduleTypeId) external view returns (bool);
        function isInitialized(address smartAccount) external view returns (bool);
    }

    /// The deterministic account factory.
    #[derive(Debug, PartialEq, Eq)]
    interface IAccountFactory {
        event AccountCreated(address indexed account, address indexed owner, bytes32 salt);

        function createAccount(address owner, bytes32 salt) external returns (address account);
        function getAddress(address owner, bytes32 salt) external view returns (address account);
        function accountImplementation() external view returns (address);
        function entryPoint() external view returns (address);
    }
}
