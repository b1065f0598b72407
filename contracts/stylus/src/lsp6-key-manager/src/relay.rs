//! LSP25 relay-call verification: signature, validity window and nonce.

use stylus_sdk::alloy_primitives::{Address, U256};

use lsp6_key_manager_types::{relay_call_digest, Host, NonceStore, ValidityError, ValidityTimestamps};

use crate::{
    errors::{
        ChannelIdOverflow, InvalidRelayNonce, InvalidRelaySignature, KeyManagerError, NonceOverflow,
        RelayCallBeforeStartTime, RelayCallExpired,
    },
    nonce::{NonceChannelManager, NonceError},
};

/// A signed request to run `payload` on behalf of its signer.
#[derive(Debug, Clone, Copy)]
pub struct RelayCall<'a> {
    pub signature: &'a [u8],
    pub nonce: U256,
    pub validity_timestamps: U256,
    /// Value the signer bound into the signature; must equal what is forwarded.
    pub msg_value: U256,
    pub payload: &'a [u8],
}

pub struct RelayCallVerifier<'a, H: Host + ?Sized> {
    host: &'a H,
}

impl<'a, H: Host + ?Sized> RelayCallVerifier<'a, H> {
    pub fn new(host: &'a H) -> Self {
        Self { host }
    }

    /// Recover the signer, check the validity window, then consume the nonce.
    /// Returns the signer on success.
    pub fn verify<S: NonceStore + ?Sized>(
        &self,
        nonces: &mut NonceChannelManager<'_, S>,
        call: &RelayCall<'_>,
    ) -> Result<Address, KeyManagerError> {
        if call.payload.len() < 4 {
            return Err(KeyManagerError::invalid_payload(call.payload));
        }

        let digest = relay_call_digest(
            self.host.key_manager(),
            self.host.chain_id(),
            call.nonce,
            call.validity_timestamps,
            call.msg_value,
            call.payload,
        );
        let signer = self.host.recover_signer(digest, call.signature).ok_or_else(|| {
            KeyManagerError::InvalidRelaySignature(InvalidRelaySignature {
                signature: call.signature.to_vec().into(),
            })
        })?;

        ValidityTimestamps::from_word(call.validity_timestamps)
            .check(self.host.block_timestamp())
            .map_err(|e| match e {
                ValidityError::BeforeStartTime => KeyManagerError::RelayCallBeforeStartTime(RelayCallBeforeStartTime {}),
                ValidityError::Expired => KeyManagerError::RelayCallExpired(RelayCallExpired {}),
            })?;

        nonces.consume_packed(signer, call.nonce).map_err(|e| match e {
            NonceError::Invalid { .. } => KeyManagerError::InvalidRelayNonce(InvalidRelayNonce {
                signer,
                invalidNonce: call.nonce,
                signature: call.signature.to_vec().into(),
            }),
            NonceError::Exhausted { channel } => KeyManagerError::NonceOverflow(NonceOverflow {
                signer,
                channelId: channel,
            }),
            NonceError::ChannelIdOverflow(channel_id) => {
                KeyManagerError::ChannelIdOverflow(ChannelIdOverflow { channelId: channel_id })
            }
        })?;

        Ok(signer)
    }
}
