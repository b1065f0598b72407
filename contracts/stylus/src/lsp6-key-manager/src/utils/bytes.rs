//! Byte-slice helpers for payloads and stored data values.

use stylus_sdk::alloy_primitives::{Address, FixedBytes};

/// First four bytes of `data`. Callers check the length.
pub fn selector_of(data: &[u8]) -> FixedBytes<4> {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&data[0..4]);
    FixedBytes(buf)
}

/// Big-endian `uint128` stored as exactly 16 bytes.
pub fn read_u128_exact(value: &[u8]) -> Result<u128, ()> {
    let buf: [u8; 16] = value.try_into().map_err(|_| ())?;
    Ok(u128::from_be_bytes(buf))
}

/// Address stored as exactly 20 bytes.
pub fn read_address_exact(value: &[u8]) -> Result<Address, ()> {
    if value.len() != 20 {
        return Err(());
    }
    Ok(Address::from_slice(value))
}
