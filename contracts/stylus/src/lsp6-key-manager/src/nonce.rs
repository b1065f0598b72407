//! Multi-channel relay nonces.
//!
//! Each signer owns up to 2^128 independent channels. Within a channel nonces are
//! consumed strictly in sequence; channels never affect each other.

use alloc::collections::BTreeMap;

use stylus_sdk::alloy_primitives::{Address, U256};

use lsp6_key_manager_types::{relay::split_u256, NonceStore, RelayNonce};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceError {
    /// Channel id does not fit in 128 bits.
    ChannelIdOverflow(U256),
    /// Presented nonce is not the channel's next one.
    Invalid { expected: u128 },
    /// Channel has used every sequence number.
    Exhausted { channel: u128 },
}

pub struct NonceChannelManager<'a, S: NonceStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: NonceStore + ?Sized> NonceChannelManager<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Next sequence number of `signer`'s `channel_id`.
    pub fn get_nonce(&self, signer: Address, channel_id: U256) -> Result<u128, NonceError> {
        let channel = channel_of(channel_id)?;
        Ok(self.store.load(signer, channel))
    }

    pub fn get_packed_nonce(&self, signer: Address, channel_id: U256) -> Result<U256, NonceError> {
        packed_nonce(&*self.store, signer, channel_id)
    }

    pub fn is_valid(&self, signer: Address, nonce: U256) -> bool {
        let RelayNonce { channel, sequence } = RelayNonce::from_word(nonce);
        self.store.load(signer, channel) == sequence
    }

    /// Accept `presented` on `channel_id` only if it is the channel's next nonce, then advance.
    pub fn consume(&mut self, signer: Address, channel_id: U256, presented: u128) -> Result<(), NonceError> {
        let channel = channel_of(channel_id)?;
        let expected = self.store.load(signer, channel);
        if presented != expected {
            return Err(NonceError::Invalid { expected });
        }
        let next = expected.checked_add(1).ok_or(NonceError::Exhausted { channel })?;
        self.store.store(signer, channel, next);
        Ok(())
    }

    /// `consume` for a packed relay nonce.
    pub fn consume_packed(&mut self, signer: Address, nonce: U256) -> Result<(), NonceError> {
        let RelayNonce { channel, sequence } = RelayNonce::from_word(nonce);
        self.consume(signer, U256::from(channel), sequence)
    }
}

/// Next nonce in the packed `channel << 128 | sequence` form relayers sign.
pub fn packed_nonce<S: NonceStore + ?Sized>(store: &S, signer: Address, channel_id: U256) -> Result<U256, NonceError> {
    let channel = channel_of(channel_id)?;
    let sequence = store.load(signer, channel);
    Ok(RelayNonce { channel, sequence }.to_word())
}

fn channel_of(channel_id: U256) -> Result<u128, NonceError> {
    let (high, low) = split_u256(channel_id);
    if high != 0 {
        return Err(NonceError::ChannelIdOverflow(channel_id));
    }
    Ok(low)
}

/// In-memory nonce store for off-chain simulation and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryNonceStore {
    nonces: BTreeMap<(Address, u128), u128>,
}

impl NonceStore for MemoryNonceStore {
    fn load(&self, signer: Address, channel: u128) -> u128 {
        self.nonces.get(&(signer, channel)).copied().unwrap_or(0)
    }

    fn store(&mut self, signer: Address, channel: u128, value: u128) {
        self.nonces.insert((signer, channel), value);
    }
}
