//! Shared types for the LSP6 key manager: permissions, data keys, allow-list codecs,
//! LSP14 ownership and the seams the key manager talks to its profile through.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod allowed;
pub mod compact;
pub mod keys;
pub mod operation;
pub mod ownership;
pub mod permissions;
pub mod profile;
pub mod relay;

pub use allowed::{
    AllowListError, AllowedCall, AllowedCalls, AllowedDataKey, AllowedDataKeys, CallRestriction, CallTypes,
    DataKeyRestriction, ANY_ADDRESS, ANY_BYTES4,
};
pub use compact::{decode_compact_bytes_array, encode_compact_bytes_array, CompactArrayError};
pub use keys::{DataKeyError, PermissionDataKey};
pub use operation::OperationType;
pub use ownership::{Ownable2Step, OwnershipError, OwnershipEvent};
pub use permissions::{name_of, permission_by_name, Permissions};
pub use profile::{Erc725Profile, Host, NonceStore, ProfileError};
pub use relay::{relay_call_digest, RelayNonce, ValidityError, ValidityTimestamps};
