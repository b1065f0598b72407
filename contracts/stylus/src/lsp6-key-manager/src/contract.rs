//! Stylus entrypoint of the LSP6 key manager.
//!
//! One manager controls one ERC725 profile (its `target`). Controllers call `execute*`
//! directly or have a relayer submit their signed payloads through `executeRelayCall*`.

use alloc::vec::Vec;

use stylus_sdk::{
    abi::Bytes,
    alloy_primitives::{Address, FixedBytes, U256},
    prelude::*,
    stylus_core::log,
};

use lsp6_key_manager_types::NonceStore;

use crate::{
    config::KeyManagerConfig,
    errors::{AlreadyInitialized, ChannelIdOverflow, KeyManagerError, NotInitialized},
    key_manager::{is_valid_signature, KeyManager, ERC1271_FAILURE_VALUE},
    nonce::packed_nonce,
    profile::{OnchainHost, OnchainProfile},
};

sol_storage! {
    #[entrypoint]
    pub struct LSP6KeyManager {
        /// The controlled ERC725 profile; zero until initialized.
        address target;

        RelayNonces nonces;
    }

    /// Relay nonces: signer => channel => next sequence number.
    pub struct RelayNonces {
        mapping(address => mapping(uint256 => uint256)) by_channel;
    }
}

impl NonceStore for RelayNonces {
    fn load(&self, signer: Address, channel: u128) -> u128 {
        // only ever written from a u128
        self.by_channel
            .getter(signer)
            .get(U256::from(channel))
            .saturating_to::<u128>()
    }

    fn store(&mut self, signer: Address, channel: u128, value: u128) {
        self.by_channel
            .setter(signer)
            .insert(U256::from(channel), U256::from(value));
    }
}

#[public]
impl LSP6KeyManager {
    /// Bind this manager to its profile. Can only be done once.
    pub fn initialize(&mut self, target: Address) -> Result<(), KeyManagerError> {
        let current = self.target.get();
        if current != Address::ZERO {
            return Err(KeyManagerError::AlreadyInitialized(AlreadyInitialized {
                target: current,
            }));
        }
        if target == Address::ZERO {
            return Err(KeyManagerError::NotInitialized(NotInitialized {}));
        }
        self.target.set(target);
        Ok(())
    }

    pub fn target(&self) -> Address {
        self.target.get()
    }

    #[payable]
    pub fn execute(&mut self, payload: Bytes) -> Result<Bytes, KeyManagerError> {
        let caller = self.vm().msg_sender();
        let msg_value = self.vm().msg_value();
        self.with_key_manager(|km| km.execute(caller, msg_value, &payload))
            .map(Bytes::from)
    }

    #[payable]
    pub fn execute_batch(&mut self, values: Vec<U256>, payloads: Vec<Bytes>) -> Result<Vec<Bytes>, KeyManagerError> {
        let caller = self.vm().msg_sender();
        let msg_value = self.vm().msg_value();
        let payloads: Vec<&[u8]> = payloads.iter().map(|p| p.as_slice()).collect();
        let results = self.with_key_manager(|km| km.execute_batch(caller, msg_value, &values, &payloads))?;
        Ok(results.into_iter().map(Bytes::from).collect())
    }

    #[payable]
    pub fn execute_relay_call(
        &mut self,
        signature: Bytes,
        nonce: U256,
        validity_timestamps: U256,
        payload: Bytes,
    ) -> Result<Bytes, KeyManagerError> {
        let msg_value = self.vm().msg_value();
        self.with_key_manager(|km| km.execute_relay_call(msg_value, &signature, nonce, validity_timestamps, &payload))
            .map(Bytes::from)
    }

    #[payable]
    pub fn execute_relay_call_batch(
        &mut self,
        signatures: Vec<Bytes>,
        nonces: Vec<U256>,
        validity_timestamps: Vec<U256>,
        values: Vec<U256>,
        payloads: Vec<Bytes>,
    ) -> Result<Vec<Bytes>, KeyManagerError> {
        let msg_value = self.vm().msg_value();
        let signatures: Vec<&[u8]> = signatures.iter().map(|s| s.as_slice()).collect();
        let payloads: Vec<&[u8]> = payloads.iter().map(|p| p.as_slice()).collect();
        let results = self.with_key_manager(|km| {
            km.execute_relay_call_batch(msg_value, &signatures, &nonces, &validity_timestamps, &values, &payloads)
        })?;
        Ok(results.into_iter().map(Bytes::from).collect())
    }

    /// Packed `channel << 128 | sequence` nonce the signer must use next on `channel_id`.
    pub fn get_nonce(&self, from: Address, channel_id: U256) -> Result<U256, KeyManagerError> {
        packed_nonce(&self.nonces, from, channel_id)
            .map_err(|_| KeyManagerError::ChannelIdOverflow(ChannelIdOverflow { channelId: channel_id }))
    }

    /// ERC1271 on behalf of the profile: a signature is valid when its signer holds SIGN.
    pub fn is_valid_signature(&self, data_hash: FixedBytes<32>, signature: Bytes) -> FixedBytes<4> {
        let target = self.target.get();
        if target == Address::ZERO {
            return ERC1271_FAILURE_VALUE;
        }
        let host = self.host();
        let profile = OnchainProfile::new(target);
        is_valid_signature(&host, &profile, data_hash, &signature)
    }
}

impl LSP6KeyManager {
    fn host(&self) -> OnchainHost {
        OnchainHost {
            key_manager: self.vm().contract_address(),
            chain_id: self.vm().chain_id(),
            block_timestamp: self.vm().block_timestamp(),
        }
    }

    /// Run `f` against the key manager core, then emit the verification events it recorded.
    fn with_key_manager<T, F>(&mut self, f: F) -> Result<T, KeyManagerError>
    where
        F: FnOnce(&mut KeyManager<'_, OnchainHost, OnchainProfile, RelayNonces>) -> Result<T, KeyManagerError>,
    {
        let target = self.target.get();
        if target == Address::ZERO {
            return Err(KeyManagerError::NotInitialized(NotInitialized {}));
        }
        let host = self.host();
        let mut profile = OnchainProfile::new(target);

        let (result, verified) = {
            let mut km = KeyManager::new(&host, &mut profile, &mut self.nonces, KeyManagerConfig::default());
            let result = f(&mut km)?;
            (result, km.take_verified())
        };
        for event in verified {
            log(self.vm(), event);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylus_sdk::{alloy_primitives::address, testing::*};

    const PROFILE: Address = address!("00000000000000000000000000000000000000aa");
    const SIGNER: Address = address!("00000000000000000000000000000000000000bb");

    #[test]
    fn initializes_once() {
        let vm = TestVM::default();
        let mut contract = LSP6KeyManager::from(&vm);

        assert_eq!(contract.target(), Address::ZERO);
        assert_eq!(
            contract.initialize(Address::ZERO),
            Err(KeyManagerError::NotInitialized(NotInitialized {}))
        );
        assert_eq!(contract.initialize(PROFILE), Ok(()));
        assert_eq!(contract.target(), PROFILE);
        assert_eq!(
            contract.initialize(SIGNER),
            Err(KeyManagerError::AlreadyInitialized(AlreadyInitialized { target: PROFILE }))
        );
    }

    #[test]
    fn execute_requires_initialization() {
        let vm = TestVM::default();
        let mut contract = LSP6KeyManager::from(&vm);
        assert_eq!(
            contract.execute(Bytes::from(vec![0x7f, 0x23, 0x69, 0x0c])),
            Err(KeyManagerError::NotInitialized(NotInitialized {}))
        );
    }

    #[test]
    fn get_nonce_reads_packed_channel_nonce() {
        let vm = TestVM::default();
        let mut contract = LSP6KeyManager::from(&vm);

        assert_eq!(contract.get_nonce(SIGNER, U256::from(3u8)), Ok(U256::from(3u8) << 128));
        contract.nonces.store(SIGNER, 3, 2);
        assert_eq!(
            contract.get_nonce(SIGNER, U256::from(3u8)),
            Ok((U256::from(3u8) << 128) | U256::from(2u8))
        );
        let too_big = U256::from(1u8) << 128;
        assert!(matches!(
            contract.get_nonce(SIGNER, too_big),
            Err(KeyManagerError::ChannelIdOverflow(_))
        ));
    }
}
