//! The ERC725 profile a key manager controls, as seen from inside the contract.

pub mod onchain;

pub use onchain::{OnchainHost, OnchainProfile};
