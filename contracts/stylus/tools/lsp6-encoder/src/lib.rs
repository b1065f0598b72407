//! Off-chain helpers for the LSP6 key manager: controller setup payloads and
//! LSP25 relay-call signatures.

pub mod bundle;
pub mod config;
pub mod encoder;
pub mod error;
pub mod signer;

mod tests;

pub use bundle::{update_bundle, Section};
pub use config::{AllowedCallConfig, ControllerConfig, SetupFile};
pub use encoder::{
    encode_allowed_calls, encode_allowed_data_keys, encode_permissions, encode_permissions_setup,
    set_data_batch_payload, DataEntries,
};
pub use error::EncoderError;
pub use signer::{relay_digest, relay_message, sign_relay_call, signer_address, SignedRelayCall};
