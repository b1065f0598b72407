use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolCall};
use tracing::debug;

use lsp6_key_manager_types::{
    keys::{allowed_calls_key, allowed_data_keys_key, array_index_key, permissions_key, ADDRESS_PERMISSIONS_ARRAY},
    permission_by_name, AllowedCall, AllowedCalls, AllowedDataKey, AllowedDataKeys, CallTypes, OperationType,
    Permissions, ANY_ADDRESS, ANY_BYTES4,
};

use crate::{
    config::{AllowedCallConfig, ControllerConfig, SetupFile},
    error::EncoderError,
};

sol! {
    function setDataBatch(bytes32[] dataKeys, bytes[] dataValues);
    function execute(uint256 operationType, address target, uint256 value, bytes data);
}

/// Data keys and values to write in one `setDataBatch`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataEntries {
    pub keys: Vec<B256>,
    pub values: Vec<Vec<u8>>,
}

impl DataEntries {
    pub fn push(&mut self, key: B256, value: Vec<u8>) {
        self.keys.push(key);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// OR together named permissions. `ALL_PERMISSIONS` is accepted as a name.
pub fn encode_permissions(names: &[String]) -> Result<Permissions, EncoderError> {
    let mut permissions = Permissions::NONE;
    for name in names {
        let name = name.trim().to_ascii_uppercase();
        permissions |= match name.as_str() {
            "ALL_PERMISSIONS" => Permissions::ALL_PERMISSIONS,
            _ => permission_by_name(&name).ok_or(EncoderError::UnknownPermission(name.clone()))?,
        };
    }
    Ok(permissions)
}

fn call_types(names: &[String]) -> Result<CallTypes, EncoderError> {
    let mut types = CallTypes::NONE;
    for name in names {
        let bit = match name.trim().to_ascii_uppercase().as_str() {
            "VALUE" => CallTypes::VALUE,
            "CALL" => CallTypes::CALL,
            "STATICCALL" => CallTypes::STATICCALL,
            "DELEGATECALL" => CallTypes::DELEGATECALL,
            _ => return Err(EncoderError::UnknownCallType(name.clone())),
        };
        types = types.union(bit);
    }
    Ok(types)
}

/// Compact-encoded `AllowedCalls` value.
pub fn encode_allowed_calls(calls: &[AllowedCallConfig]) -> Result<Vec<u8>, EncoderError> {
    let mut entries = Vec::with_capacity(calls.len());
    for call in calls {
        entries.push(AllowedCall {
            call_types: call_types(&call.call_types)?,
            address: call.address.unwrap_or(ANY_ADDRESS),
            standard: call.standard.unwrap_or(ANY_BYTES4),
            function: call.function.unwrap_or(ANY_BYTES4),
        });
    }
    Ok(AllowedCalls(entries).encode())
}

/// Compact-encoded `AllowedERC725YDataKeys` value.
pub fn encode_allowed_data_keys<T: AsRef<[u8]>>(keys: &[T]) -> Result<Vec<u8>, EncoderError> {
    let mut entries = Vec::with_capacity(keys.len());
    for key in keys {
        let key = key.as_ref();
        let entry = AllowedDataKey::new(key).map_err(|_| EncoderError::InvalidAllowedDataKey(hex::encode(key)))?;
        entries.push(entry);
    }
    AllowedDataKeys(entries)
        .encode()
        .map_err(|_| EncoderError::InvalidAllowedDataKey(String::new()))
}

fn encode_controller(controller: &ControllerConfig, entries: &mut DataEntries) -> Result<(), EncoderError> {
    let permissions = encode_permissions(&controller.permissions)?;
    if permissions.is_empty() {
        return Err(EncoderError::EmptyPermissions(controller.address.to_string()));
    }
    entries.push(permissions_key(controller.address), permissions.to_be_bytes().to_vec());

    if !controller.allowed_calls.is_empty() {
        let value = encode_allowed_calls(&controller.allowed_calls)?;
        debug!(controller = %controller.address, allowed_calls = %hex::encode(&value), "encoded allowed calls");
        entries.push(allowed_calls_key(controller.address), value);
    }
    if !controller.allowed_data_keys.is_empty() {
        let value = encode_allowed_data_keys(&controller.allowed_data_keys)?;
        debug!(controller = %controller.address, allowed_data_keys = %hex::encode(&value), "encoded allowed data keys");
        entries.push(allowed_data_keys_key(controller.address), value);
    }
    Ok(())
}

/// Every data key/value that registers the file's controllers on a profile,
/// including their `AddressPermissions[]` entries and the new array length.
pub fn encode_permissions_setup(setup: &SetupFile) -> Result<DataEntries, EncoderError> {
    let mut entries = DataEntries::default();
    let mut index = setup.existing_controllers;

    for controller in &setup.controllers {
        entries.push(array_index_key(index), controller.address.to_vec());
        encode_controller(controller, &mut entries)?;
        index += 1;
    }
    entries.push(ADDRESS_PERMISSIONS_ARRAY, index.to_be_bytes().to_vec());
    Ok(entries)
}

/// ABI-encoded `setDataBatch(bytes32[],bytes[])` payload for the key manager.
pub fn set_data_batch_payload(entries: &DataEntries) -> Vec<u8> {
    setDataBatchCall {
        dataKeys: entries.keys.clone(),
        dataValues: entries.values.iter().map(|v| v.clone().into()).collect(),
    }
    .abi_encode()
}

/// ABI-encoded ERC725X `execute` payload.
pub fn execute_payload(operation: OperationType, target: Address, value: U256, data: &[u8]) -> Vec<u8> {
    executeCall {
        operationType: U256::from(operation as u8),
        target,
        value,
        data: data.to_vec().into(),
    }
    .abi_encode()
}
