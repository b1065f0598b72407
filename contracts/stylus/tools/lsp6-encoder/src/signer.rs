use alloy_primitives::{Address, FixedBytes, U256};
use k256::{
    ecdsa::SigningKey,
    elliptic_curve::sec1::ToEncodedPoint,
};
use serde::Serialize;
use sha3::{Digest, Keccak256};

use lsp6_key_manager_types::relay::{relay_call_message, RelayNonce, ValidityTimestamps};

use crate::error::EncoderError;

/// A relay call ready to hand to a relayer.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedRelayCall {
    pub signer: Address,
    pub key_manager: Address,
    pub chain_id: u64,
    pub nonce: U256,
    pub validity_timestamps: U256,
    pub value: U256,
    pub payload: String,
    pub signature: String,
}

fn keccak256_bytes(bytes: &[u8]) -> FixedBytes<32> {
    let mut h = Keccak256::new();
    h.update(bytes);
    let out = h.finalize();
    let mut b = [0u8; 32];
    b.copy_from_slice(out.as_slice());
    FixedBytes(b)
}

/// LSP25 message: `encodePacked(25, chainId, nonce, validityTimestamps, value, payload)`.
pub fn relay_message(chain_id: u64, nonce: U256, validity_timestamps: U256, value: U256, payload: &[u8]) -> Vec<u8> {
    relay_call_message(chain_id, nonce, validity_timestamps, value, payload)
}

/// EIP-191 version 0 digest of the relay message, bound to `key_manager`.
pub fn relay_digest(
    key_manager: Address,
    chain_id: u64,
    nonce: U256,
    validity_timestamps: U256,
    value: U256,
    payload: &[u8],
) -> FixedBytes<32> {
    let message = relay_message(chain_id, nonce, validity_timestamps, value, payload);
    let mut buf = Vec::with_capacity(2 + 20 + message.len());
    buf.extend_from_slice(b"\x19\x00");
    buf.extend_from_slice(key_manager.as_slice());
    buf.extend_from_slice(&message);
    keccak256_bytes(&buf)
}

pub fn signer_address(signing_key: &SigningKey) -> Address {
    let point = signing_key.verifying_key().to_encoded_point(false);
    let hash = keccak256_bytes(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Sign a relay call for `key_manager`. The signature is `r || s || v` with `v` in {27, 28}.
#[allow(clippy::too_many_arguments)]
pub fn sign_relay_call(
    signing_key: &SigningKey,
    key_manager: Address,
    chain_id: u64,
    channel: u128,
    sequence: u128,
    validity: ValidityTimestamps,
    value: U256,
    payload: &[u8],
) -> Result<SignedRelayCall, EncoderError> {
    let nonce = RelayNonce { channel, sequence }.to_word();
    let validity_timestamps = validity.to_word();
    let digest = relay_digest(key_manager, chain_id, nonce, validity_timestamps, value, payload);

    let (signature, recovery_id) = signing_key.sign_prehash_recoverable(digest.as_slice())?;
    let mut sig_bytes = Vec::with_capacity(65);
    sig_bytes.extend_from_slice(&signature.to_bytes());
    sig_bytes.push(27 + recovery_id.to_byte());

    Ok(SignedRelayCall {
        signer: signer_address(signing_key),
        key_manager,
        chain_id,
        nonce,
        validity_timestamps,
        value,
        payload: format!("0x{}", hex::encode(payload)),
        signature: format!("0x{}", hex::encode(sig_bytes)),
    })
}

/// Parse a `0x`-prefixed or bare hex private key.
pub fn parse_signing_key(key: &str) -> Result<SigningKey, EncoderError> {
    let bytes = hex::decode(key.trim().trim_start_matches("0x"))?;
    Ok(SigningKey::from_slice(&bytes)?)
}
