use core::ops::{BitAnd, BitOr, BitOrAssign, Not};

use alloy_primitives::{FixedBytes, U256};

/// A controller's permission word: a `bytes32` read as a big-endian bit set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Permissions(pub U256);

const fn bit(value: u64) -> Permissions {
    Permissions(U256::from_limbs([value, 0, 0, 0]))
}

impl Permissions {
    pub const NONE: Self = Permissions(U256::ZERO);

    pub const CHANGEOWNER: Self = bit(0x01);
    pub const ADDCONTROLLER: Self = bit(0x02);
    pub const EDITPERMISSIONS: Self = bit(0x04);
    pub const ADDEXTENSIONS: Self = bit(0x08);
    pub const CHANGEEXTENSIONS: Self = bit(0x10);
    pub const ADDUNIVERSALRECEIVERDELEGATE: Self = bit(0x20);
    pub const CHANGEUNIVERSALRECEIVERDELEGATE: Self = bit(0x40);
    pub const REENTRANCY: Self = bit(0x80);
    pub const SUPER_TRANSFERVALUE: Self = bit(0x0100);
    pub const TRANSFERVALUE: Self = bit(0x0200);
    pub const SUPER_CALL: Self = bit(0x0400);
    pub const CALL: Self = bit(0x0800);
    pub const SUPER_STATICCALL: Self = bit(0x1000);
    pub const STATICCALL: Self = bit(0x2000);
    pub const SUPER_DELEGATECALL: Self = bit(0x4000);
    pub const DELEGATECALL: Self = bit(0x8000);
    pub const DEPLOY: Self = bit(0x01_0000);
    pub const SUPER_SETDATA: Self = bit(0x02_0000);
    pub const SETDATA: Self = bit(0x04_0000);
    pub const ENCRYPT: Self = bit(0x08_0000);
    pub const DECRYPT: Self = bit(0x10_0000);
    pub const SIGN: Self = bit(0x20_0000);
    pub const EXECUTE_RELAY_CALL: Self = bit(0x40_0000);

    /// Every named permission except REENTRANCY, DELEGATECALL and SUPER_DELEGATECALL.
    pub const ALL_PERMISSIONS: Self = bit(0x7f_3f7f);

    pub const fn from_word(word: U256) -> Self {
        Permissions(word)
    }

    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Permissions(U256::from_be_bytes(bytes))
    }

    /// Read a stored permission value the way `bytes32(value)` does: left-aligned,
    /// right-padded with zeros, truncated after 32 bytes.
    pub fn from_stored_value(value: &[u8]) -> Self {
        let mut word = [0u8; 32];
        let len = value.len().min(32);
        word[..len].copy_from_slice(&value[..len]);
        Self::from_be_bytes(word)
    }

    pub fn word(self) -> U256 {
        self.0
    }

    pub fn to_be_bytes(self) -> [u8; 32] {
        self.0.to_be_bytes::<32>()
    }

    pub fn to_fixed_bytes(self) -> FixedBytes<32> {
        FixedBytes(self.to_be_bytes())
    }

    pub fn is_empty(self) -> bool {
        self.0.is_zero()
    }

    /// True when every bit of `required` is granted.
    pub fn has_all(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// True when at least one bit of `mask` is granted.
    pub fn has_any(self, mask: Self) -> bool {
        !(self.0 & mask.0).is_zero()
    }

    /// True when the SUPER counterpart of any plain permission in `category` is granted.
    pub fn has_any_super(self, category: Self) -> bool {
        SUPER_PAIRS
            .iter()
            .any(|(plain, sup)| category.has_all(*plain) && self.has_all(*sup))
    }

    /// Bits of `required` that are not granted.
    pub fn missing(self, required: Self) -> Self {
        Permissions(required.0 & !self.0)
    }

    /// Name of the lowest missing bit of `required`, if any bit is missing.
    pub fn first_missing_name(self, required: Self) -> Option<&'static str> {
        let missing = self.missing(required);
        if missing.is_empty() {
            return None;
        }
        PERMISSION_NAMES
            .iter()
            .find(|(p, _)| missing.has_all(*p))
            .map(|(_, name)| *name)
    }

    /// Iterate over the named single-bit permissions granted by this word.
    pub fn iter_names(self) -> impl Iterator<Item = &'static str> {
        PERMISSION_NAMES
            .iter()
            .filter(move |(p, _)| self.has_all(*p))
            .map(|(_, name)| *name)
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Permissions(self.0 | rhs.0)
    }
}

impl BitOrAssign for Permissions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Permissions {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Permissions(self.0 & rhs.0)
    }
}

impl Not for Permissions {
    type Output = Self;

    fn not(self) -> Self {
        Permissions(!self.0)
    }
}

/// Named permissions in ascending bit order.
pub const PERMISSION_NAMES: [(Permissions, &str); 23] = [
    (Permissions::CHANGEOWNER, "CHANGEOWNER"),
    (Permissions::ADDCONTROLLER, "ADDCONTROLLER"),
    (Permissions::EDITPERMISSIONS, "EDITPERMISSIONS"),
    (Permissions::ADDEXTENSIONS, "ADDEXTENSIONS"),
    (Permissions::CHANGEEXTENSIONS, "CHANGEEXTENSIONS"),
    (Permissions::ADDUNIVERSALRECEIVERDELEGATE, "ADDUNIVERSALRECEIVERDELEGATE"),
    (Permissions::CHANGEUNIVERSALRECEIVERDELEGATE, "CHANGEUNIVERSALRECEIVERDELEGATE"),
    (Permissions::REENTRANCY, "REENTRANCY"),
    (Permissions::SUPER_TRANSFERVALUE, "SUPER_TRANSFERVALUE"),
    (Permissions::TRANSFERVALUE, "TRANSFERVALUE"),
    (Permissions::SUPER_CALL, "SUPER_CALL"),
    (Permissions::CALL, "CALL"),
    (Permissions::SUPER_STATICCALL, "SUPER_STATICCALL"),
    (Permissions::STATICCALL, "STATICCALL"),
    (Permissions::SUPER_DELEGATECALL, "SUPER_DELEGATECALL"),
    (Permissions::DELEGATECALL, "DELEGATECALL"),
    (Permissions::DEPLOY, "DEPLOY"),
    (Permissions::SUPER_SETDATA, "SUPER_SETDATA"),
    (Permissions::SETDATA, "SETDATA"),
    (Permissions::ENCRYPT, "ENCRYPT"),
    (Permissions::DECRYPT, "DECRYPT"),
    (Permissions::SIGN, "SIGN"),
    (Permissions::EXECUTE_RELAY_CALL, "EXECUTE_RELAY_CALL"),
];

/// Plain permissions that a SUPER permission lifts the allow-list from.
const SUPER_PAIRS: [(Permissions, Permissions); 4] = [
    (Permissions::TRANSFERVALUE, Permissions::SUPER_TRANSFERVALUE),
    (Permissions::CALL, Permissions::SUPER_CALL),
    (Permissions::STATICCALL, Permissions::SUPER_STATICCALL),
    (Permissions::DELEGATECALL, Permissions::SUPER_DELEGATECALL),
];

/// Canonical name of a single-bit permission.
pub fn name_of(permission: Permissions) -> Option<&'static str> {
    PERMISSION_NAMES
        .iter()
        .find(|(p, _)| *p == permission)
        .map(|(_, name)| *name)
}

/// Look up a single-bit permission by its canonical name.
pub fn permission_by_name(name: &str) -> Option<Permissions> {
    PERMISSION_NAMES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(p, _)| *p)
}
