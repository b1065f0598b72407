//! Signature recovery through the EVM `ecrecover` precompile.

use alloc::vec::Vec;

use stylus_sdk::{
    alloy_primitives::{Address, FixedBytes},
    call::RawCall,
};

/// Recover an EOA address from a 32-byte digest and a 65-byte `r || s || v` signature.
///
/// Notes:
/// - We use the EVM `ecrecover` precompile at address `0x01`.
/// - `v` may be given as {0,1} or {27,28}; anything else is rejected.
/// - Upper-half `s` values are rejected (EIP-2 malleability rule).
pub fn ecrecover_address(digest: FixedBytes<32>, signature: &[u8]) -> Result<Address, ()> {
    if signature.len() != 65 {
        return Err(());
    }
    let r = &signature[0..32];
    let s = &signature[32..64];
    let v = match signature[64] {
        27 | 28 => signature[64],
        0 | 1 => signature[64] + 27,
        _ => return Err(()),
    };
    if !is_low_s(s) {
        return Err(());
    }

    // Precompile address 0x01.
    let mut precompile = [0u8; 20];
    precompile[19] = 1;
    let to = Address::from_slice(&precompile);

    let mut input: Vec<u8> = Vec::with_capacity(128);
    input.extend_from_slice(digest.as_slice());
    // v as 32-byte big-endian word.
    input.extend_from_slice(&[0u8; 31]);
    input.push(v);
    input.extend_from_slice(r);
    input.extend_from_slice(s);

    let out = unsafe { RawCall::new_static().gas(50_000).call(to, &input) }.map_err(|_| ())?;
    // precompile returns nothing on failure, else the address in the low 20 bytes of a word
    if out.len() < 32 {
        return Err(());
    }
    let recovered = Address::from_slice(&out[12..32]);
    if recovered == Address::ZERO {
        return Err(());
    }
    Ok(recovered)
}

/// secp256k1 `n / 2`.
const HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x5d, 0x57,
    0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

pub fn is_low_s(s: &[u8]) -> bool {
    s <= &HALF_ORDER[..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_s_boundary() {
        assert!(is_low_s(&HALF_ORDER));
        assert!(is_low_s(&[0u8; 32]));
        let mut high = HALF_ORDER;
        high[31] += 1;
        assert!(!is_low_s(&high));
        assert!(!is_low_s(&[0xff; 32]));
    }

    #[test]
    fn rejects_bad_shapes_before_calling_precompile() {
        assert_eq!(ecrecover_address(FixedBytes::ZERO, &[0u8; 64]), Err(()));
        let mut sig = [0u8; 65];
        sig[64] = 29;
        assert_eq!(ecrecover_address(FixedBytes::ZERO, &sig), Err(()));
    }
}
