//! Typed reads of controller permissions and restrictions from the profile's ERC725Y store.

use alloc::vec::Vec;

use stylus_sdk::alloy_primitives::{Address, B256};

use lsp6_key_manager_types::{
    keys::{allowed_calls_key, allowed_data_keys_key, array_index_key, permissions_key, ADDRESS_PERMISSIONS_ARRAY},
    AllowListError, AllowedCalls, AllowedDataKeys, Erc725Profile, Permissions,
};

use crate::{
    errors::{InvalidEncodedAllowedCalls, KeyManagerError},
    utils::bytes::{read_address_exact, read_u128_exact},
};

pub struct PermissionStore<'a, P: Erc725Profile + ?Sized> {
    profile: &'a P,
}

impl<'a, P: Erc725Profile + ?Sized> PermissionStore<'a, P> {
    pub fn new(profile: &'a P) -> Self {
        Self { profile }
    }

    pub fn raw(&self, key: B256) -> Result<Vec<u8>, KeyManagerError> {
        Ok(self.profile.get_data(key)?)
    }

    pub fn get_permissions(&self, controller: Address) -> Result<Permissions, KeyManagerError> {
        let value = self.raw(permissions_key(controller))?;
        Ok(Permissions::from_stored_value(&value))
    }

    pub fn get_allowed_calls(&self, controller: Address) -> Result<AllowedCalls, KeyManagerError> {
        let value = self.raw(allowed_calls_key(controller))?;
        AllowedCalls::decode(&value).map_err(|e| match e {
            AllowListError::Compact(inner) => inner.into(),
            AllowListError::InvalidAllowedCallLength(_) => {
                KeyManagerError::InvalidEncodedAllowedCalls(InvalidEncodedAllowedCalls {
                    allowedCallsValue: value.clone().into(),
                })
            }
        })
    }

    pub fn get_allowed_data_keys(&self, controller: Address) -> Result<AllowedDataKeys, KeyManagerError> {
        let value = self.raw(allowed_data_keys_key(controller))?;
        Ok(AllowedDataKeys::decode(&value)?)
    }

    /// `AddressPermissions[]`; an empty value means no controllers were ever listed.
    pub fn get_controller_count(&self) -> Result<u128, KeyManagerError> {
        let value = self.raw(ADDRESS_PERMISSIONS_ARRAY)?;
        if value.is_empty() {
            return Ok(0);
        }
        read_u128_exact(&value).map_err(|_| KeyManagerError::invalid_data_value(ADDRESS_PERMISSIONS_ARRAY, &value))
    }

    /// `AddressPermissions[index]`; `None` for a cleared slot.
    pub fn get_controller_at(&self, index: u128) -> Result<Option<Address>, KeyManagerError> {
        let key = array_index_key(index);
        let value = self.raw(key)?;
        if value.is_empty() {
            return Ok(None);
        }
        read_address_exact(&value)
            .map(Some)
            .map_err(|_| KeyManagerError::invalid_data_value(key, &value))
    }

    /// Every listed controller, in index order. A cleared slot below the length is malformed.
    pub fn controllers(&self) -> Result<Vec<Address>, KeyManagerError> {
        let count = self.get_controller_count()?;
        let mut out = Vec::new();
        for index in 0..count {
            match self.get_controller_at(index)? {
                Some(controller) => out.push(controller),
                None => return Err(KeyManagerError::invalid_data_value(array_index_key(index), &[])),
            }
        }
        Ok(out)
    }
}
