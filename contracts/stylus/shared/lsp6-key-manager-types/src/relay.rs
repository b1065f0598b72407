//! LSP25 relay-call message layout, shared by the key manager and signing tools.

use alloc::vec::Vec;

use alloy_primitives::{keccak256, Address, B256, U256};

/// `LSP25_VERSION` bound into every relay-call signature.
pub const LSP25_VERSION: u64 = 25;

/// Split a `uint256` into its high and low 128-bit halves.
pub fn split_u256(word: U256) -> (u128, u128) {
    let limbs = word.as_limbs();
    let low = (limbs[0] as u128) | ((limbs[1] as u128) << 64);
    let high = (limbs[2] as u128) | ((limbs[3] as u128) << 64);
    (high, low)
}

pub fn join_u256(high: u128, low: u128) -> U256 {
    U256::from_limbs([
        low as u64,
        (low >> 64) as u64,
        high as u64,
        (high >> 64) as u64,
    ])
}

/// Relay nonce: `channelId << 128 | sequence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayNonce {
    pub channel: u128,
    pub sequence: u128,
}

impl RelayNonce {
    pub fn from_word(nonce: U256) -> Self {
        let (channel, sequence) = split_u256(nonce);
        Self { channel, sequence }
    }

    pub fn to_word(self) -> U256 {
        join_u256(self.channel, self.sequence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityError {
    BeforeStartTime,
    Expired,
}

/// Relay-call validity window: start in the high 128 bits, end in the low 128 bits.
/// Zero on either side leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidityTimestamps {
    pub start: u128,
    pub end: u128,
}

impl ValidityTimestamps {
    pub fn from_word(word: U256) -> Self {
        let (start, end) = split_u256(word);
        Self { start, end }
    }

    pub fn to_word(self) -> U256 {
        join_u256(self.start, self.end)
    }

    pub fn check(&self, now: u64) -> Result<(), ValidityError> {
        let now = now as u128;
        if now < self.start {
            return Err(ValidityError::BeforeStartTime);
        }
        if self.end != 0 && now > self.end {
            return Err(ValidityError::Expired);
        }
        Ok(())
    }
}

/// `abi.encodePacked(LSP25_VERSION, chainId, nonce, validityTimestamps, msgValue, payload)`.
pub fn relay_call_message(
    chain_id: u64,
    nonce: U256,
    validity_timestamps: U256,
    msg_value: U256,
    payload: &[u8],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32 * 5 + payload.len());
    buf.extend_from_slice(&U256::from(LSP25_VERSION).to_be_bytes::<32>());
    buf.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    buf.extend_from_slice(&nonce.to_be_bytes::<32>());
    buf.extend_from_slice(&validity_timestamps.to_be_bytes::<32>());
    buf.extend_from_slice(&msg_value.to_be_bytes::<32>());
    buf.extend_from_slice(payload);
    buf
}

/// EIP-191 version `0x00` digest: `keccak256(0x19 || 0x00 || validator || message)`.
pub fn eip191_validator_digest(validator: Address, message: &[u8]) -> B256 {
    let mut buf = Vec::with_capacity(2 + 20 + message.len());
    buf.extend_from_slice(&[0x19, 0x00]);
    buf.extend_from_slice(validator.as_slice());
    buf.extend_from_slice(message);
    keccak256(buf)
}

/// Digest a relayer's signer must sign for `key_manager` to run `payload`.
pub fn relay_call_digest(
    key_manager: Address,
    chain_id: u64,
    nonce: U256,
    validity_timestamps: U256,
    msg_value: U256,
    payload: &[u8],
) -> B256 {
    let message = relay_call_message(chain_id, nonce, validity_timestamps, msg_value, payload);
    eip191_validator_digest(key_manager, &message)
}
