//! The key manager pipeline: decode, authorize, then forward to the profile.
//!
//! Everything here is generic over the profile, the host and the nonce store so the
//! same code runs in the Stylus entrypoint and against in-memory doubles.

use alloc::vec::Vec;

use stylus_sdk::alloy_primitives::{Address, FixedBytes, B256, U256};

use lsp6_key_manager_types::{Erc725Profile, Host, NonceStore, Permissions};

use crate::{
    authorizer::AuthorizationEngine,
    batch::run_batch,
    config::KeyManagerConfig,
    decoder::{decode_operation, DecodeError, DecodedOperation},
    errors::{
        BatchExecuteParamsLengthMismatch, BatchExecuteRelayCallParamsLengthMismatch, ChannelIdOverflow,
        ERC725X_ExecuteParametersEmptyArray, ERC725X_ExecuteParametersLengthMismatch, ERC725X_UnknownOperationType,
        ERC725Y_DataKeysValuesEmptyArray, ERC725Y_DataKeysValuesLengthMismatch, InvalidERC725Function,
        KeyManagerError,
    },
    interfaces::PermissionsVerified,
    nonce::{packed_nonce, NonceChannelManager},
    permission_store::PermissionStore,
    relay::{RelayCall, RelayCallVerifier},
};

/// ERC1271 `isValidSignature` success value.
pub const ERC1271_SUCCESS_VALUE: FixedBytes<4> = FixedBytes([0x16, 0x26, 0xba, 0x7e]);
/// ERC1271 `isValidSignature` failure value.
pub const ERC1271_FAILURE_VALUE: FixedBytes<4> = FixedBytes([0xff, 0xff, 0xff, 0xff]);

pub struct KeyManager<'a, H, P, S>
where
    H: Host + ?Sized,
    P: Erc725Profile + ?Sized,
    S: NonceStore + ?Sized,
{
    host: &'a H,
    profile: &'a mut P,
    nonces: &'a mut S,
    config: KeyManagerConfig,
    verified: Vec<PermissionsVerified>,
}

impl<'a, H, P, S> KeyManager<'a, H, P, S>
where
    H: Host + ?Sized,
    P: Erc725Profile + ?Sized,
    S: NonceStore + ?Sized,
{
    pub fn new(host: &'a H, profile: &'a mut P, nonces: &'a mut S, config: KeyManagerConfig) -> Self {
        Self {
            host,
            profile,
            nonces,
            config,
            verified: Vec::new(),
        }
    }

    /// Run `payload` on the profile for `caller`, forwarding `msg_value`.
    pub fn execute(&mut self, caller: Address, msg_value: U256, payload: &[u8]) -> Result<Vec<u8>, KeyManagerError> {
        self.verify_and_forward(caller, msg_value, payload, false)
    }

    /// Run each payload in order with its own value. `msg_value` must equal the sum.
    pub fn execute_batch(
        &mut self,
        caller: Address,
        msg_value: U256,
        values: &[U256],
        payloads: &[&[u8]],
    ) -> Result<Vec<Vec<u8>>, KeyManagerError> {
        if values.len() != payloads.len() {
            return Err(KeyManagerError::BatchExecuteParamsLengthMismatch(
                BatchExecuteParamsLengthMismatch {},
            ));
        }
        run_batch(values, msg_value, |i, value| {
            self.verify_and_forward(caller, value, payloads[i], false)
        })
    }

    /// Run a payload signed off-chain by a controller; the signer is the caller.
    pub fn execute_relay_call(
        &mut self,
        msg_value: U256,
        signature: &[u8],
        nonce: U256,
        validity_timestamps: U256,
        payload: &[u8],
    ) -> Result<Vec<u8>, KeyManagerError> {
        let call = RelayCall {
            signature,
            nonce,
            validity_timestamps,
            msg_value,
            payload,
        };
        let signer = {
            let mut nonces = NonceChannelManager::new(&mut *self.nonces);
            RelayCallVerifier::new(self.host).verify(&mut nonces, &call)?
        };
        self.verify_and_forward(signer, msg_value, payload, true)
    }

    pub fn execute_relay_call_batch(
        &mut self,
        msg_value: U256,
        signatures: &[&[u8]],
        nonces: &[U256],
        validity_timestamps: &[U256],
        values: &[U256],
        payloads: &[&[u8]],
    ) -> Result<Vec<Vec<u8>>, KeyManagerError> {
        let n = signatures.len();
        if nonces.len() != n || validity_timestamps.len() != n || values.len() != n || payloads.len() != n {
            return Err(KeyManagerError::BatchExecuteRelayCallParamsLengthMismatch(
                BatchExecuteRelayCallParamsLengthMismatch {},
            ));
        }
        run_batch(values, msg_value, |i, value| {
            self.execute_relay_call(value, signatures[i], nonces[i], validity_timestamps[i], payloads[i])
        })
    }

    /// Next packed nonce `signer` must sign on `channel_id`.
    pub fn get_nonce(&self, signer: Address, channel_id: U256) -> Result<U256, KeyManagerError> {
        // reading can only fail on the channel id
        packed_nonce(&*self.nonces, signer, channel_id)
            .map_err(|_| KeyManagerError::ChannelIdOverflow(ChannelIdOverflow { channelId: channel_id }))
    }

    pub fn is_valid_signature(&self, hash: B256, signature: &[u8]) -> FixedBytes<4> {
        is_valid_signature(self.host, &*self.profile, hash, signature)
    }

    /// Verified payloads since the last call, in execution order.
    pub fn take_verified(&mut self) -> Vec<PermissionsVerified> {
        core::mem::take(&mut self.verified)
    }

    fn verify_and_forward(
        &mut self,
        caller: Address,
        msg_value: U256,
        payload: &[u8],
        is_relay: bool,
    ) -> Result<Vec<u8>, KeyManagerError> {
        let operation = decode_payload(payload)?;
        AuthorizationEngine::new(&*self.profile, self.host.key_manager(), self.config).authorize(
            caller,
            msg_value,
            &operation,
            is_relay,
        )?;
        self.verified.push(PermissionsVerified {
            signer: caller,
            value: msg_value,
            selector: operation.selector(),
        });
        Ok(self.profile.forward(msg_value, payload)?)
    }
}

/// ERC1271 check on behalf of the profile: valid when the recovered signer holds SIGN.
/// Never fails; every problem reads as the failure value.
pub fn is_valid_signature<H, P>(host: &H, profile: &P, hash: B256, signature: &[u8]) -> FixedBytes<4>
where
    H: Host + ?Sized,
    P: Erc725Profile + ?Sized,
{
    let Some(signer) = host.recover_signer(hash, signature) else {
        return ERC1271_FAILURE_VALUE;
    };
    match PermissionStore::new(profile).get_permissions(signer) {
        Ok(permissions) if permissions.has_all(Permissions::SIGN) => ERC1271_SUCCESS_VALUE,
        _ => ERC1271_FAILURE_VALUE,
    }
}

/// Decode a payload, mapping decoder failures to the errors callers see.
pub fn decode_payload(payload: &[u8]) -> Result<DecodedOperation, KeyManagerError> {
    decode_operation(payload).map_err(|e| match e {
        DecodeError::Malformed => KeyManagerError::invalid_payload(payload),
        DecodeError::UnknownSelector(selector) => {
            KeyManagerError::InvalidERC725Function(InvalidERC725Function {
                invalidFunction: selector,
            })
        }
        DecodeError::UnknownOperationType(operation) => {
            KeyManagerError::UnknownOperationType(ERC725X_UnknownOperationType {
                operationTypeProvided: operation,
            })
        }
        DecodeError::ExecuteParamsLengthMismatch => {
            KeyManagerError::ExecuteParametersLengthMismatch(ERC725X_ExecuteParametersLengthMismatch {})
        }
        DecodeError::ExecuteParamsEmpty => {
            KeyManagerError::ExecuteParametersEmptyArray(ERC725X_ExecuteParametersEmptyArray {})
        }
        DecodeError::DataKeysValuesLengthMismatch => {
            KeyManagerError::DataKeysValuesLengthMismatch(ERC725Y_DataKeysValuesLengthMismatch {})
        }
        DecodeError::DataKeysValuesEmpty => {
            KeyManagerError::DataKeysValuesEmptyArray(ERC725Y_DataKeysValuesEmptyArray {})
        }
    })
}
