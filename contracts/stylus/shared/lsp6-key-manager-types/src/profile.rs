use alloc::vec::Vec;

use alloy_primitives::{Address, FixedBytes, B256, U256};

/// Errors while talking to the controlled profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// Used by off-chain mocks or partially implemented profiles.
    NotImplemented,
    /// The underlying call failed; carries the revert data when there is any.
    CallFailed(Vec<u8>),
    /// Return data was malformed or could not be decoded.
    MalformedReturn,
}

/// The ERC725 account a key manager controls, implemented differently on-chain vs off-chain.
pub trait Erc725Profile {
    /// Address of the profile contract.
    fn address(&self) -> Address;

    fn get_data(&self, key: B256) -> Result<Vec<u8>, ProfileError>;

    fn get_data_batch(&self, keys: &[B256]) -> Result<Vec<Vec<u8>>, ProfileError> {
        keys.iter().map(|key| self.get_data(*key)).collect()
    }

    fn owner(&self) -> Result<Address, ProfileError> {
        Err(ProfileError::NotImplemented)
    }

    fn pending_owner(&self) -> Result<Address, ProfileError> {
        Err(ProfileError::NotImplemented)
    }

    /// ERC165 probe of an arbitrary contract; never fails, answers `false` instead.
    fn supports_interface(&self, _target: Address, _interface_id: FixedBytes<4>) -> bool {
        false
    }

    /// Call the profile with `payload`, attaching `value`. Returns the raw return data.
    fn forward(&mut self, value: U256, payload: &[u8]) -> Result<Vec<u8>, ProfileError>;
}

/// Chain context and cryptography the key manager needs from its host.
pub trait Host {
    /// Address of the key manager itself.
    fn key_manager(&self) -> Address;

    fn chain_id(&self) -> u64;

    fn block_timestamp(&self) -> u64;

    /// Recover the signer of a 32-byte digest from a 65-byte `r || s || v` signature.
    fn recover_signer(&self, digest: B256, signature: &[u8]) -> Option<Address>;
}

/// Storage for per-signer, per-channel relay nonces.
pub trait NonceStore {
    fn load(&self, signer: Address, channel: u128) -> u128;

    fn store(&mut self, signer: Address, channel: u128, value: u128);
}
