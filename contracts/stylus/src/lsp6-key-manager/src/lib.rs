//! LSP6 Key Manager for Arbitrum Stylus.
//!
//! Gates every call into an ERC725 profile on the caller's permission word, AllowedCalls
//! and AllowedERC725YDataKeys, with LSP25 relay calls on multi-channel nonces.

#![cfg_attr(not(any(test, feature = "export-abi")), no_main)]
#![cfg_attr(not(any(test, feature = "export-abi")), no_std)]

#[macro_use]
extern crate alloc;

pub mod authorizer;
pub mod batch;
pub mod config;
pub mod contract;
pub mod decoder;
pub mod errors;
pub mod interfaces;
pub mod key_manager;
pub mod nonce;
pub mod permission_store;
pub mod profile;
pub mod relay;
pub mod utils;

#[cfg(test)]
mod tests;

pub use config::KeyManagerConfig;
pub use contract::LSP6KeyManager;
pub use errors::KeyManagerError;
pub use key_manager::KeyManager;
