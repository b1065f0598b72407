//! Controller restrictions: `AllowedCalls` and `AllowedERC725YDataKeys`.

use alloc::vec::Vec;

use alloy_primitives::{Address, FixedBytes, B256};

use crate::compact::{decode_compact_bytes_array, encode_compact_bytes_array, CompactArrayError};

/// Call-type bits carried in the first 4 bytes of an `AllowedCalls` entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallTypes(pub u32);

impl CallTypes {
    pub const NONE: Self = CallTypes(0);
    pub const VALUE: Self = CallTypes(0x01);
    pub const CALL: Self = CallTypes(0x02);
    pub const STATICCALL: Self = CallTypes(0x04);
    pub const DELEGATECALL: Self = CallTypes(0x08);

    pub fn contains(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    pub fn union(self, other: Self) -> Self {
        CallTypes(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Matches any address in an `AllowedCalls` entry.
pub const ANY_ADDRESS: Address = Address::new([0xff; 20]);
/// Matches any interface id or function selector in an `AllowedCalls` entry.
pub const ANY_BYTES4: FixedBytes<4> = FixedBytes([0xff; 4]);

/// One `AllowedCalls` entry: `callTypes(4) || address(20) || standard(4) || function(4)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllowedCall {
    pub call_types: CallTypes,
    pub address: Address,
    pub standard: FixedBytes<4>,
    pub function: FixedBytes<4>,
}

impl AllowedCall {
    pub const ENCODED_LEN: usize = 32;

    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        let mut call_types = [0u8; 4];
        call_types.copy_from_slice(&bytes[0..4]);
        Self {
            call_types: CallTypes(u32::from_be_bytes(call_types)),
            address: Address::from_slice(&bytes[4..24]),
            standard: FixedBytes::from_slice(&bytes[24..28]),
            function: FixedBytes::from_slice(&bytes[28..32]),
        }
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[0..4].copy_from_slice(&self.call_types.0.to_be_bytes());
        out[4..24].copy_from_slice(self.address.as_slice());
        out[24..28].copy_from_slice(self.standard.as_slice());
        out[28..32].copy_from_slice(self.function.as_slice());
        out
    }

    /// All-zero and all-`0xff` entries are never valid.
    pub fn is_malformed(&self) -> bool {
        let bytes = self.to_bytes();
        bytes == [0u8; 32] || bytes == [0xffu8; 32]
    }

    /// Whether this entry authorises a call of `required` types to `target` with `selector`.
    ///
    /// `supports_interface` is only consulted when the entry pins a standard.
    pub fn matches<F>(
        &self,
        required: CallTypes,
        target: Address,
        selector: FixedBytes<4>,
        supports_interface: &mut F,
    ) -> bool
    where
        F: FnMut(Address, FixedBytes<4>) -> bool,
    {
        if !self.call_types.contains(required) {
            return false;
        }
        if self.address != ANY_ADDRESS && self.address != target {
            return false;
        }
        if self.function != ANY_BYTES4 && self.function != selector {
            return false;
        }
        self.standard == ANY_BYTES4 || supports_interface(target, self.standard)
    }
}

/// Errors while decoding an allow-list value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowListError {
    Compact(CompactArrayError),
    /// An `AllowedCalls` element is not exactly 32 bytes (carries its length).
    InvalidAllowedCallLength(usize),
}

impl From<CompactArrayError> for AllowListError {
    fn from(e: CompactArrayError) -> Self {
        AllowListError::Compact(e)
    }
}

/// Outcome of checking a call against a controller's `AllowedCalls`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallRestriction {
    /// The controller has no entries at all.
    Empty,
    /// An all-zero or all-`0xff` entry was reached before any match.
    MalformedEntry,
    NotAllowed,
}

/// Decoded `AddressPermissions:AllowedCalls:<controller>` value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowedCalls(pub Vec<AllowedCall>);

impl AllowedCalls {
    pub fn decode(value: &[u8]) -> Result<Self, AllowListError> {
        let elements = decode_compact_bytes_array(value)?;
        let mut calls = Vec::with_capacity(elements.len());
        for element in elements {
            let entry: &[u8; 32] = element
                .try_into()
                .map_err(|_| AllowListError::InvalidAllowedCallLength(element.len()))?;
            calls.push(AllowedCall::from_bytes(entry));
        }
        Ok(AllowedCalls(calls))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.0.len() * (2 + AllowedCall::ENCODED_LEN));
        for call in &self.0 {
            buf.extend_from_slice(&(AllowedCall::ENCODED_LEN as u16).to_be_bytes());
            buf.extend_from_slice(&call.to_bytes());
        }
        buf
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Walk entries in order; the first match authorises the call.
    pub fn verify<F>(
        &self,
        required: CallTypes,
        target: Address,
        selector: FixedBytes<4>,
        mut supports_interface: F,
    ) -> Result<(), CallRestriction>
    where
        F: FnMut(Address, FixedBytes<4>) -> bool,
    {
        if self.0.is_empty() {
            return Err(CallRestriction::Empty);
        }
        for call in &self.0 {
            if call.is_malformed() {
                return Err(CallRestriction::MalformedEntry);
            }
            if call.matches(required, target, selector, &mut supports_interface) {
                return Ok(());
            }
        }
        Err(CallRestriction::NotAllowed)
    }
}

/// One `AllowedERC725YDataKeys` element: a full key (32 bytes) or a key prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllowedDataKey(Vec<u8>);

impl AllowedDataKey {
    pub fn new(bytes: &[u8]) -> Result<Self, CompactArrayError> {
        if bytes.is_empty() || bytes.len() > 32 {
            return Err(CompactArrayError::InvalidLengthElement(bytes.len().min(u16::MAX as usize) as u16));
        }
        Ok(AllowedDataKey(bytes.to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Exact match for a 32-byte element, prefix match otherwise.
    pub fn matches(&self, key: &B256) -> bool {
        key.as_slice().starts_with(&self.0)
    }
}

/// Outcome of checking data keys against a controller's `AllowedERC725YDataKeys`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKeyRestriction {
    Empty,
    NotAllowed(B256),
}

/// Decoded `AddressPermissions:AllowedERC725YDataKeys:<controller>` value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowedDataKeys(pub Vec<AllowedDataKey>);

impl AllowedDataKeys {
    pub fn decode(value: &[u8]) -> Result<Self, CompactArrayError> {
        let elements = decode_compact_bytes_array(value)?;
        Ok(AllowedDataKeys(
            elements.into_iter().map(|e| AllowedDataKey(e.to_vec())).collect(),
        ))
    }

    pub fn encode(&self) -> Result<Vec<u8>, CompactArrayError> {
        let elements: Vec<&[u8]> = self.0.iter().map(|k| k.as_bytes()).collect();
        encode_compact_bytes_array(&elements)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn verify_single_key(&self, key: B256) -> Result<(), DataKeyRestriction> {
        if self.0.is_empty() {
            return Err(DataKeyRestriction::Empty);
        }
        if self.0.iter().any(|allowed| allowed.matches(&key)) {
            Ok(())
        } else {
            Err(DataKeyRestriction::NotAllowed(key))
        }
    }

    /// Check every key whose `skip` flag is false; reports the first disallowed key.
    pub fn verify_multiple_keys(&self, keys: &[B256], skip: &[bool]) -> Result<(), DataKeyRestriction> {
        let mut pending = keys
            .iter()
            .zip(skip.iter().copied().chain(core::iter::repeat(false)))
            .filter(|(_, skipped)| !skipped)
            .map(|(key, _)| *key)
            .peekable();

        if pending.peek().is_none() {
            return Ok(());
        }
        if self.0.is_empty() {
            return Err(DataKeyRestriction::Empty);
        }
        for key in pending {
            self.verify_single_key(key)?;
        }
        Ok(())
    }
}
