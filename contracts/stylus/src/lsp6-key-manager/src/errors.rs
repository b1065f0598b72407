//! Revert reasons surfaced by the key manager.

use alloc::{string::String, vec::Vec};

use alloy_sol_types::sol;
use stylus_sdk::{
    alloy_primitives::{Address, FixedBytes, U256},
    stylus_proc::SolidityError,
};

use lsp6_key_manager_types::{CompactArrayError, DataKeyError, ProfileError};

sol! {
    // Permission denial.
    #[derive(Debug, PartialEq, Eq)]
    error NotAuthorised(address from, string permission);
    #[derive(Debug, PartialEq, Eq)]
    error NoPermissionsSet(address from);

    // Allow-list denial.
    #[derive(Debug, PartialEq, Eq)]
    error NotAllowedCall(address from, address to, bytes4 selector);
    #[derive(Debug, PartialEq, Eq)]
    error NoCallsAllowed(address from);
    #[derive(Debug, PartialEq, Eq)]
    error InvalidWhitelistedCall(address from);
    #[derive(Debug, PartialEq, Eq)]
    error NotAllowedERC725YDataKey(address from, bytes32 disallowedKey);
    #[derive(Debug, PartialEq, Eq)]
    error NoERC725YDataKeysAllowed(address from);

    // Malformed input.
    #[derive(Debug, PartialEq, Eq)]
    error NotRecognisedPermissionKey(bytes32 dataKey);
    #[derive(Debug, PartialEq, Eq)]
    error InvalidDataValuesForDataKeys(bytes32 dataKey, bytes dataValue);
    #[derive(Debug, PartialEq, Eq)]
    error InvalidEncodedAllowedCalls(bytes allowedCallsValue);
    #[derive(Debug, PartialEq, Eq)]
    error InvalidEncodedAllowedERC725YDataKeys(bytes value);
    #[derive(Debug, PartialEq, Eq)]
    error InvalidCompactByteArrayLengthElement(uint16 invalidLength);
    #[derive(Debug, PartialEq, Eq)]
    error InvalidPayload(bytes payload);
    #[derive(Debug, PartialEq, Eq)]
    error InvalidERC725Function(bytes4 invalidFunction);
    #[derive(Debug, PartialEq, Eq)]
    error ERC725X_UnknownOperationType(uint256 operationTypeProvided);
    #[derive(Debug, PartialEq, Eq)]
    error ERC725X_MsgValueDisallowedInStaticCall();
    #[derive(Debug, PartialEq, Eq)]
    error ERC725X_ExecuteParametersLengthMismatch();
    #[derive(Debug, PartialEq, Eq)]
    error ERC725X_ExecuteParametersEmptyArray();
    #[derive(Debug, PartialEq, Eq)]
    error ERC725Y_DataKeysValuesLengthMismatch();
    #[derive(Debug, PartialEq, Eq)]
    error ERC725Y_DataKeysValuesEmptyArray();

    // Forbidden operations.
    #[derive(Debug, PartialEq, Eq)]
    error CallingKeyManagerNotAllowed();
    #[derive(Debug, PartialEq, Eq)]
    error DelegateCallDisallowedViaKeyManager();
    #[derive(Debug, PartialEq, Eq)]
    error CannotSendValueToSetData();
    #[derive(Debug, PartialEq, Eq)]
    error LSP14CannotTransferOwnershipToSelf();

    // Batches.
    #[derive(Debug, PartialEq, Eq)]
    error BatchExecuteParamsLengthMismatch();
    #[derive(Debug, PartialEq, Eq)]
    error BatchExecuteRelayCallParamsLengthMismatch();
    #[derive(Debug, PartialEq, Eq)]
    error LSP6BatchInsufficientValueSent(uint256 totalValues, uint256 msgValue);
    #[derive(Debug, PartialEq, Eq)]
    error LSP6BatchExcessiveValueSent(uint256 totalValues, uint256 msgValue);

    // Relay calls.
    #[derive(Debug, PartialEq, Eq)]
    error InvalidRelayNonce(address signer, uint256 invalidNonce, bytes signature);
    #[derive(Debug, PartialEq, Eq)]
    error InvalidRelaySignature(bytes signature);
    #[derive(Debug, PartialEq, Eq)]
    error RelayCallBeforeStartTime();
    #[derive(Debug, PartialEq, Eq)]
    error RelayCallExpired();
    #[derive(Debug, PartialEq, Eq)]
    error ChannelIdOverflow(uint256 channelId);
    #[derive(Debug, PartialEq, Eq)]
    error NonceOverflow(address signer, uint128 channelId);

    // Plumbing.
    #[derive(Debug, PartialEq, Eq)]
    error ProfileCallFailed(bytes returnData);
    #[derive(Debug, PartialEq, Eq)]
    error AlreadyInitialized(address target);
    #[derive(Debug, PartialEq, Eq)]
    error NotInitialized();
}

#[derive(SolidityError, Debug, PartialEq, Eq)]
pub enum KeyManagerError {
    NotAuthorised(NotAuthorised),
    NoPermissionsSet(NoPermissionsSet),
    NotAllowedCall(NotAllowedCall),
    NoCallsAllowed(NoCallsAllowed),
    InvalidWhitelistedCall(InvalidWhitelistedCall),
    NotAllowedERC725YDataKey(NotAllowedERC725YDataKey),
    NoERC725YDataKeysAllowed(NoERC725YDataKeysAllowed),
    NotRecognisedPermissionKey(NotRecognisedPermissionKey),
    InvalidDataValuesForDataKeys(InvalidDataValuesForDataKeys),
    InvalidEncodedAllowedCalls(InvalidEncodedAllowedCalls),
    InvalidEncodedAllowedERC725YDataKeys(InvalidEncodedAllowedERC725YDataKeys),
    InvalidCompactByteArrayLengthElement(InvalidCompactByteArrayLengthElement),
    InvalidPayload(InvalidPayload),
    InvalidERC725Function(InvalidERC725Function),
    UnknownOperationType(ERC725X_UnknownOperationType),
    MsgValueDisallowedInStaticCall(ERC725X_MsgValueDisallowedInStaticCall),
    ExecuteParametersLengthMismatch(ERC725X_ExecuteParametersLengthMismatch),
    ExecuteParametersEmptyArray(ERC725X_ExecuteParametersEmptyArray),
    DataKeysValuesLengthMismatch(ERC725Y_DataKeysValuesLengthMismatch),
    DataKeysValuesEmptyArray(ERC725Y_DataKeysValuesEmptyArray),
    CallingKeyManagerNotAllowed(CallingKeyManagerNotAllowed),
    DelegateCallDisallowedViaKeyManager(DelegateCallDisallowedViaKeyManager),
    CannotSendValueToSetData(CannotSendValueToSetData),
    CannotTransferOwnershipToSelf(LSP14CannotTransferOwnershipToSelf),
    BatchExecuteParamsLengthMismatch(BatchExecuteParamsLengthMismatch),
    BatchExecuteRelayCallParamsLengthMismatch(BatchExecuteRelayCallParamsLengthMismatch),
    BatchInsufficientValueSent(LSP6BatchInsufficientValueSent),
    BatchExcessiveValueSent(LSP6BatchExcessiveValueSent),
    InvalidRelayNonce(InvalidRelayNonce),
    InvalidRelaySignature(InvalidRelaySignature),
    RelayCallBeforeStartTime(RelayCallBeforeStartTime),
    RelayCallExpired(RelayCallExpired),
    ChannelIdOverflow(ChannelIdOverflow),
    NonceOverflow(NonceOverflow),
    ProfileCallFailed(ProfileCallFailed),
    AlreadyInitialized(AlreadyInitialized),
    NotInitialized(NotInitialized),
}

impl KeyManagerError {
    pub fn not_authorised(from: Address, permission: &str) -> Self {
        KeyManagerError::NotAuthorised(NotAuthorised {
            from,
            permission: String::from(permission),
        })
    }

    pub fn no_permissions_set(from: Address) -> Self {
        KeyManagerError::NoPermissionsSet(NoPermissionsSet { from })
    }

    pub fn invalid_payload(payload: &[u8]) -> Self {
        KeyManagerError::InvalidPayload(InvalidPayload {
            payload: payload.to_vec().into(),
        })
    }

    pub fn invalid_data_value(key: FixedBytes<32>, value: &[u8]) -> Self {
        KeyManagerError::InvalidDataValuesForDataKeys(InvalidDataValuesForDataKeys {
            dataKey: key,
            dataValue: value.to_vec().into(),
        })
    }

    pub fn batch_value_mismatch(total: U256, attached: U256) -> Self {
        if total > attached {
            KeyManagerError::BatchInsufficientValueSent(LSP6BatchInsufficientValueSent {
                totalValues: total,
                msgValue: attached,
            })
        } else {
            KeyManagerError::BatchExcessiveValueSent(LSP6BatchExcessiveValueSent {
                totalValues: total,
                msgValue: attached,
            })
        }
    }

    /// The missing permission name, when this is a permission denial.
    pub fn missing_permission(&self) -> Option<&str> {
        match self {
            KeyManagerError::NotAuthorised(e) => Some(e.permission.as_str()),
            _ => None,
        }
    }
}

impl From<CompactArrayError> for KeyManagerError {
    fn from(e: CompactArrayError) -> Self {
        match e {
            CompactArrayError::InvalidLengthElement(len) => {
                KeyManagerError::InvalidCompactByteArrayLengthElement(InvalidCompactByteArrayLengthElement {
                    invalidLength: len,
                })
            }
        }
    }
}

impl From<DataKeyError> for KeyManagerError {
    fn from(e: DataKeyError) -> Self {
        match e {
            DataKeyError::NotRecognisedPermissionKey(key) => {
                KeyManagerError::NotRecognisedPermissionKey(NotRecognisedPermissionKey { dataKey: key })
            }
        }
    }
}

impl From<ProfileError> for KeyManagerError {
    fn from(e: ProfileError) -> Self {
        let return_data: Vec<u8> = match e {
            ProfileError::CallFailed(data) => data,
            ProfileError::NotImplemented | ProfileError::MalformedReturn => Vec::new(),
        };
        KeyManagerError::ProfileCallFailed(ProfileCallFailed {
            returnData: return_data.into(),
        })
    }
}
