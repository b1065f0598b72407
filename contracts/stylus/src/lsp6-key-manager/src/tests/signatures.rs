use stylus_sdk::alloy_primitives::{b256, B256, U256};

use lsp6_key_manager_types::Permissions;

use super::mock::*;
use crate::key_manager::{ERC1271_FAILURE_VALUE, ERC1271_SUCCESS_VALUE};

const MESSAGE_HASH: B256 = b256!("5d1f5d34dbcbdd8e1d3c03df5f1a9c2b27d6f0b5e3b4a0f6fc1c1f3a9d2e4b71");

#[test]
fn signer_with_sign_permission_is_accepted() {
    let (key, signer) = signer(21);
    let mut h = Harness::default();
    h.grant(signer, Permissions::SIGN);

    let signature = sign_digest(&key, MESSAGE_HASH);
    let result = h.transact(U256::ZERO, |km| Ok(km.is_valid_signature(MESSAGE_HASH, &signature)));
    assert_eq!(result, Ok(ERC1271_SUCCESS_VALUE));
}

#[test]
fn signer_without_sign_permission_is_refused() {
    let (key, signer) = signer(22);
    let mut h = Harness::default();
    h.grant(signer, Permissions::SIGN.missing(Permissions::ALL_PERMISSIONS));

    let signature = sign_digest(&key, MESSAGE_HASH);
    let result = h.transact(U256::ZERO, |km| Ok(km.is_valid_signature(MESSAGE_HASH, &signature)));
    assert_eq!(result, Ok(ERC1271_FAILURE_VALUE));
}

#[test]
fn unrecoverable_signatures_are_refused() {
    let (_, signer) = signer(23);
    let mut h = Harness::default();
    h.grant(signer, Permissions::SIGN);

    for signature in [vec![], vec![0u8; 65], vec![0xabu8; 70]] {
        let result = h.transact(U256::ZERO, |km| Ok(km.is_valid_signature(MESSAGE_HASH, &signature)));
        assert_eq!(result, Ok(ERC1271_FAILURE_VALUE));
    }
}
