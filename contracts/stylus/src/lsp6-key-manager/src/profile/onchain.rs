use alloc::vec::Vec;

use alloy_sol_types::SolCall;
use stylus_sdk::{
    alloy_primitives::{Address, FixedBytes, B256, U256},
    call::RawCall,
};

use lsp6_key_manager_types::{Erc725Profile, Host, ProfileError};

use crate::{
    interfaces::{IERC165, IERC725},
    utils::crypto::ecrecover_address,
};

/// Gas forwarded to an ERC165 probe, as the standard suggests.
pub const SUPPORTS_INTERFACE_GAS: u64 = 30_000;

/// Profile reached through raw calls to its ERC725 ABI.
pub struct OnchainProfile {
    pub address: Address,
}

impl OnchainProfile {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    fn view<C: SolCall>(&self, call: C) -> Result<C::Return, ProfileError> {
        let out = unsafe { RawCall::new_static().call(self.address, &call.abi_encode()) }
            .map_err(ProfileError::CallFailed)?;
        C::abi_decode_returns(&out, true).map_err(|_| ProfileError::MalformedReturn)
    }
}

impl Erc725Profile for OnchainProfile {
    fn address(&self) -> Address {
        self.address
    }

    fn get_data(&self, key: B256) -> Result<Vec<u8>, ProfileError> {
        let ret = self.view(IERC725::getDataCall { dataKey: key })?;
        Ok(ret.dataValue.to_vec())
    }

    fn get_data_batch(&self, keys: &[B256]) -> Result<Vec<Vec<u8>>, ProfileError> {
        let ret = self.view(IERC725::getDataBatchCall { dataKeys: keys.to_vec() })?;
        Ok(ret.dataValues.into_iter().map(|v| v.to_vec()).collect())
    }

    fn owner(&self) -> Result<Address, ProfileError> {
        Ok(self.view(IERC725::ownerCall {})?.ownerAddress)
    }

    fn pending_owner(&self) -> Result<Address, ProfileError> {
        Ok(self.view(IERC725::pendingOwnerCall {})?.pendingOwnerAddress)
    }

    fn supports_interface(&self, target: Address, interface_id: FixedBytes<4>) -> bool {
        let data = IERC165::supportsInterfaceCall { interfaceId: interface_id }.abi_encode();
        let out = match unsafe { RawCall::new_static().gas(SUPPORTS_INTERFACE_GAS).call(target, &data) } {
            Ok(out) => out,
            Err(_) => return false,
        };
        // EOAs and non-ERC165 contracts answer with empty or short data
        IERC165::supportsInterfaceCall::abi_decode_returns(&out, true)
            .map(|ret| ret.supported)
            .unwrap_or(false)
    }

    fn forward(&mut self, value: U256, payload: &[u8]) -> Result<Vec<u8>, ProfileError> {
        unsafe { RawCall::new_with_value(value).call(self.address, payload) }.map_err(ProfileError::CallFailed)
    }
}

/// Chain context captured from the VM at the start of a call.
#[derive(Clone, Copy, Debug)]
pub struct OnchainHost {
    pub key_manager: Address,
    pub chain_id: u64,
    pub block_timestamp: u64,
}

impl Host for OnchainHost {
    fn key_manager(&self) -> Address {
        self.key_manager
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn block_timestamp(&self) -> u64 {
        self.block_timestamp
    }

    fn recover_signer(&self, digest: B256, signature: &[u8]) -> Option<Address> {
        ecrecover_address(digest, signature).ok()
    }
}
