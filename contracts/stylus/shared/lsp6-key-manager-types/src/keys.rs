//! ERC725Y data keys read or guarded by the key manager.
//!
//! Layouts follow LSP2 `Array`, `MappingWithGrouping` and `Mapping` key types.

use alloy_primitives::{b256, fixed_bytes, Address, FixedBytes, B256};

/// `AddressPermissions[]` (array length, value is a 16-byte `uint128`).
pub const ADDRESS_PERMISSIONS_ARRAY: B256 =
    b256!("df30dba06db6a30e65354d9a64c609861f089545ca58c6b4dbe31a5f338cb0e3");

/// First 16 bytes of `AddressPermissions[]`; followed by a `uint128` index.
pub const ADDRESS_PERMISSIONS_ARRAY_PREFIX: FixedBytes<16> =
    fixed_bytes!("df30dba06db6a30e65354d9a64c60986");

/// `AddressPermissions:*` namespace (first word of the mapping-with-grouping key).
pub const ADDRESS_PERMISSIONS_PREFIX: FixedBytes<6> = fixed_bytes!("4b80742de2bf");

/// `AddressPermissions:Permissions:<address>` prefix.
pub const PERMISSIONS_PREFIX: FixedBytes<12> = fixed_bytes!("4b80742de2bf82acb3630000");

/// `AddressPermissions:AllowedERC725YDataKeys:<address>` prefix.
pub const ALLOWED_DATA_KEYS_PREFIX: FixedBytes<12> = fixed_bytes!("4b80742de2bf866c29110000");

/// `AddressPermissions:AllowedCalls:<address>` prefix.
pub const ALLOWED_CALLS_PREFIX: FixedBytes<12> = fixed_bytes!("4b80742de2bf393a64c70000");

/// `LSP1UniversalReceiverDelegate` (default delegate).
pub const LSP1_UNIVERSAL_RECEIVER_DELEGATE: B256 =
    b256!("0cfc51aec37c55a4d0b1a65c6255c4bf2fbdf6277f3cc0730c45b828b6db8b47");

/// `LSP1UniversalReceiverDelegate:<typeId>` prefix.
pub const LSP1_UNIVERSAL_RECEIVER_DELEGATE_PREFIX: FixedBytes<12> =
    fixed_bytes!("0cfc51aec37c55a4d0b10000");

/// `LSP17Extension:<bytes4 selector>` prefix.
pub const LSP17_EXTENSION_PREFIX: FixedBytes<12> = fixed_bytes!("cee78b4094da860110960000");

/// Errors while classifying a data key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKeyError {
    /// Key sits in the `AddressPermissions:*` namespace but names no known sub-class.
    NotRecognisedPermissionKey(B256),
}

/// Classification of a data key, as far as the key manager cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDataKey {
    /// `AddressPermissions[]`.
    ArrayLength,
    /// `AddressPermissions[index]`.
    ArrayIndex(u128),
    /// `AddressPermissions:Permissions:<controller>`.
    Permissions(Address),
    /// `AddressPermissions:AllowedCalls:<controller>`.
    AllowedCalls(Address),
    /// `AddressPermissions:AllowedERC725YDataKeys:<controller>`.
    AllowedDataKeys(Address),
    /// `LSP1UniversalReceiverDelegate` or one of its mapped variants; carries the full key.
    UniversalReceiverDelegate(B256),
    /// `LSP17Extension:<selector>`.
    Lsp17Extension(FixedBytes<4>),
    /// Any other key; governed by SETDATA and the allow-list.
    Generic(B256),
}

impl PermissionDataKey {
    pub fn parse(key: B256) -> Result<Self, DataKeyError> {
        let bytes = key.as_slice();

        // the length key shares its first 16 bytes with every index key
        if key == ADDRESS_PERMISSIONS_ARRAY {
            return Ok(Self::ArrayLength);
        }
        if &bytes[..16] == ADDRESS_PERMISSIONS_ARRAY_PREFIX.as_slice() {
            let mut index = [0u8; 16];
            index.copy_from_slice(&bytes[16..]);
            return Ok(Self::ArrayIndex(u128::from_be_bytes(index)));
        }

        if &bytes[..6] == ADDRESS_PERMISSIONS_PREFIX.as_slice() {
            let controller = Address::from_slice(&bytes[12..]);
            return match &bytes[..12] {
                p if p == PERMISSIONS_PREFIX.as_slice() => Ok(Self::Permissions(controller)),
                p if p == ALLOWED_CALLS_PREFIX.as_slice() => Ok(Self::AllowedCalls(controller)),
                p if p == ALLOWED_DATA_KEYS_PREFIX.as_slice() => Ok(Self::AllowedDataKeys(controller)),
                _ => Err(DataKeyError::NotRecognisedPermissionKey(key)),
            };
        }

        if key == LSP1_UNIVERSAL_RECEIVER_DELEGATE
            || &bytes[..12] == LSP1_UNIVERSAL_RECEIVER_DELEGATE_PREFIX.as_slice()
        {
            return Ok(Self::UniversalReceiverDelegate(key));
        }

        if &bytes[..12] == LSP17_EXTENSION_PREFIX.as_slice() {
            return Ok(Self::Lsp17Extension(FixedBytes::from_slice(&bytes[12..16])));
        }

        Ok(Self::Generic(key))
    }

    /// The data key this classification stands for. LSP17 keys come back in their
    /// canonical zero-padded form.
    pub fn to_key(&self) -> B256 {
        match self {
            Self::ArrayLength => ADDRESS_PERMISSIONS_ARRAY,
            Self::ArrayIndex(index) => array_index_key(*index),
            Self::Permissions(controller) => permissions_key(*controller),
            Self::AllowedCalls(controller) => allowed_calls_key(*controller),
            Self::AllowedDataKeys(controller) => allowed_data_keys_key(*controller),
            Self::UniversalReceiverDelegate(key) | Self::Generic(key) => *key,
            Self::Lsp17Extension(selector) => lsp17_extension_key(*selector),
        }
    }

    /// True for keys that write controller permissions or restrictions.
    pub fn is_permission_class(&self) -> bool {
        matches!(
            self,
            Self::ArrayLength
                | Self::ArrayIndex(_)
                | Self::Permissions(_)
                | Self::AllowedCalls(_)
                | Self::AllowedDataKeys(_)
        )
    }
}

fn mapping_key(prefix: FixedBytes<12>, controller: Address) -> B256 {
    let mut key = [0u8; 32];
    key[..12].copy_from_slice(prefix.as_slice());
    key[12..].copy_from_slice(controller.as_slice());
    B256::from(key)
}

pub fn permissions_key(controller: Address) -> B256 {
    mapping_key(PERMISSIONS_PREFIX, controller)
}

pub fn allowed_calls_key(controller: Address) -> B256 {
    mapping_key(ALLOWED_CALLS_PREFIX, controller)
}

pub fn allowed_data_keys_key(controller: Address) -> B256 {
    mapping_key(ALLOWED_DATA_KEYS_PREFIX, controller)
}

/// `AddressPermissions[index]`.
pub fn array_index_key(index: u128) -> B256 {
    let mut key = [0u8; 32];
    key[..16].copy_from_slice(ADDRESS_PERMISSIONS_ARRAY_PREFIX.as_slice());
    key[16..].copy_from_slice(&index.to_be_bytes());
    B256::from(key)
}

/// `LSP1UniversalReceiverDelegate:<typeId>`; the type id is truncated to 20 bytes.
pub fn universal_receiver_delegate_key(type_id: B256) -> B256 {
    let mut key = [0u8; 32];
    key[..12].copy_from_slice(LSP1_UNIVERSAL_RECEIVER_DELEGATE_PREFIX.as_slice());
    key[12..].copy_from_slice(&type_id[..20]);
    B256::from(key)
}

/// `LSP17Extension:<selector>`, zero-padded.
pub fn lsp17_extension_key(selector: FixedBytes<4>) -> B256 {
    let mut key = [0u8; 32];
    key[..12].copy_from_slice(LSP17_EXTENSION_PREFIX.as_slice());
    key[12..16].copy_from_slice(selector.as_slice());
    B256::from(key)
}
