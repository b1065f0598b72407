use stylus_sdk::alloy_primitives::{address, b256, Address, B256, U256};

use lsp6_key_manager_types::{NonceStore, Permissions, RelayNonce, ValidityTimestamps};

use super::mock::*;
use crate::errors::{
    BatchExecuteRelayCallParamsLengthMismatch, InvalidRelayNonce, InvalidRelaySignature, KeyManagerError,
    RelayCallBeforeStartTime, RelayCallExpired,
};

const RECIPIENT: Address = address!("0000000000000000000000000000000000000b0b");
const NOTE_KEY: B256 = b256!("4e6f7465000000000000000000000000000000000000000000000000000000aa");

fn nonce(channel: u128, sequence: u128) -> U256 {
    RelayNonce { channel, sequence }.to_word()
}

fn window(start: u128, end: u128) -> U256 {
    ValidityTimestamps { start, end }.to_word()
}

/// Relay signer allowed to set `NOTE_KEY`.
fn relayer_harness() -> (Harness, k256::ecdsa::SigningKey, Address) {
    let (key, signer) = signer(7);
    let mut h = Harness::default();
    h.grant(signer, Permissions::SETDATA | Permissions::EXECUTE_RELAY_CALL);
    h.allow_data_keys(signer, &[NOTE_KEY.as_slice()]);
    (h, key, signer)
}

#[test]
fn nonce_is_consumed_once() {
    let (mut h, key, signer) = relayer_harness();
    h.nonces.store(signer, 0, 5);

    let payload = set_data_payload(NOTE_KEY, b"hello");
    let signature = sign_relay_call(&key, nonce(0, 5), U256::ZERO, U256::ZERO, &payload);

    h.execute_relay_call(U256::ZERO, &signature, nonce(0, 5), U256::ZERO, &payload)
        .unwrap();
    assert_eq!(h.data(NOTE_KEY), b"hello");
    assert_eq!(h.get_nonce(signer, 0), nonce(0, 6));
    assert_eq!(h.events.len(), 1);
    assert_eq!(h.events[0].signer, signer);

    // replay
    assert_eq!(
        h.execute_relay_call(U256::ZERO, &signature, nonce(0, 5), U256::ZERO, &payload),
        Err(KeyManagerError::InvalidRelayNonce(InvalidRelayNonce {
            signer,
            invalidNonce: nonce(0, 5),
            signature: signature.clone().into(),
        }))
    );

    // a fresh channel starts at zero
    let payload = set_data_payload(NOTE_KEY, b"other channel");
    let signature = sign_relay_call(&key, nonce(2, 0), U256::ZERO, U256::ZERO, &payload);
    h.execute_relay_call(U256::ZERO, &signature, nonce(2, 0), U256::ZERO, &payload)
        .unwrap();
    assert_eq!(h.get_nonce(signer, 2), nonce(2, 1));
    assert_eq!(h.get_nonce(signer, 0), nonce(0, 6));
}

#[test]
fn channels_are_independent() {
    let (mut h, key, signer) = relayer_harness();
    let payload = set_data_payload(NOTE_KEY, b"x");

    for channel in (0u128..16).rev() {
        let n = nonce(channel, 0);
        let signature = sign_relay_call(&key, n, U256::ZERO, U256::ZERO, &payload);
        h.execute_relay_call(U256::ZERO, &signature, n, U256::ZERO, &payload)
            .unwrap();
    }
    for channel in 0u128..16 {
        assert_eq!(h.get_nonce(signer, channel), nonce(channel, 1));
    }

    // skipping ahead within a channel fails
    let skipped = nonce(3, 2);
    let signature = sign_relay_call(&key, skipped, U256::ZERO, U256::ZERO, &payload);
    assert!(matches!(
        h.execute_relay_call(U256::ZERO, &signature, skipped, U256::ZERO, &payload),
        Err(KeyManagerError::InvalidRelayNonce(_))
    ));
}

#[test]
fn failed_authorization_keeps_the_nonce() {
    let (key, signer) = signer(9);
    let mut h = Harness::default();
    h.grant(signer, Permissions::SETDATA);
    h.allow_data_keys(signer, &[NOTE_KEY.as_slice()]);

    let payload = set_data_payload(NOTE_KEY, b"x");
    let signature = sign_relay_call(&key, nonce(0, 0), U256::ZERO, U256::ZERO, &payload);
    assert_eq!(
        h.execute_relay_call(U256::ZERO, &signature, nonce(0, 0), U256::ZERO, &payload),
        Err(KeyManagerError::not_authorised(signer, "EXECUTE_RELAY_CALL"))
    );
    assert_eq!(h.get_nonce(signer, 0), nonce(0, 0));
    assert!(h.data(NOTE_KEY).is_empty());
}

#[test]
fn validity_window_is_enforced() {
    let (mut h, key, signer) = relayer_harness();
    let now = h.host.block_timestamp as u128;
    let payload = set_data_payload(NOTE_KEY, b"timed");

    let not_yet = window(now + 100, 0);
    let signature = sign_relay_call(&key, nonce(0, 0), not_yet, U256::ZERO, &payload);
    assert_eq!(
        h.execute_relay_call(U256::ZERO, &signature, nonce(0, 0), not_yet, &payload),
        Err(KeyManagerError::RelayCallBeforeStartTime(RelayCallBeforeStartTime {}))
    );

    let expired = window(0, now - 1);
    let signature = sign_relay_call(&key, nonce(0, 0), expired, U256::ZERO, &payload);
    assert_eq!(
        h.execute_relay_call(U256::ZERO, &signature, nonce(0, 0), expired, &payload),
        Err(KeyManagerError::RelayCallExpired(RelayCallExpired {}))
    );
    assert_eq!(h.get_nonce(signer, 0), nonce(0, 0));

    let open = window(now - 10, now + 10);
    let signature = sign_relay_call(&key, nonce(0, 0), open, U256::ZERO, &payload);
    h.execute_relay_call(U256::ZERO, &signature, nonce(0, 0), open, &payload)
        .unwrap();
    assert_eq!(h.get_nonce(signer, 0), nonce(0, 1));
}

#[test]
fn unrecoverable_signature_is_rejected() {
    let (mut h, _, _) = relayer_harness();
    let payload = set_data_payload(NOTE_KEY, b"x");
    let signature = vec![0x11u8; 64];
    assert_eq!(
        h.execute_relay_call(U256::ZERO, &signature, nonce(0, 0), U256::ZERO, &payload),
        Err(KeyManagerError::InvalidRelaySignature(InvalidRelaySignature {
            signature: signature.clone().into(),
        }))
    );
}

#[test]
fn short_payload_is_rejected_before_recovery() {
    let (mut h, key, _) = relayer_harness();
    let signature = sign_relay_call(&key, nonce(0, 0), U256::ZERO, U256::ZERO, &[0x7f, 0x23]);
    assert_eq!(
        h.execute_relay_call(U256::ZERO, &signature, nonce(0, 0), U256::ZERO, &[0x7f, 0x23]),
        Err(KeyManagerError::invalid_payload(&[0x7f, 0x23]))
    );
}

#[test]
fn signed_value_must_match_attached_value() {
    let (key, signer) = signer(11);
    let mut h = Harness::default();
    h.grant(
        signer,
        Permissions::EXECUTE_RELAY_CALL | Permissions::SUPER_TRANSFERVALUE | Permissions::SUPER_CALL,
    );
    let payload = execute_payload(lsp6_key_manager_types::OperationType::Call, RECIPIENT, ether(1), &[]);

    // signed for 1 ether, relayed with 2: recovery yields some other address
    let signature = sign_relay_call(&key, nonce(0, 0), U256::ZERO, ether(1), &payload);
    assert!(matches!(
        h.execute_relay_call(ether(2), &signature, nonce(0, 0), U256::ZERO, &payload),
        Err(KeyManagerError::NoPermissionsSet(e)) if e.from != signer
    ));

    h.execute_relay_call(ether(1), &signature, nonce(0, 0), U256::ZERO, &payload)
        .unwrap();
    assert_eq!(h.profile.balance_of(RECIPIENT), ether(1));
    assert_eq!(h.key_manager_balance, U256::ZERO);
}

#[test]
fn relay_batch_runs_each_signed_call() {
    let (mut h, key, signer) = relayer_harness();
    let first = set_data_payload(NOTE_KEY, b"one");
    let second = set_data_payload(NOTE_KEY, b"two");
    let sig_first = sign_relay_call(&key, nonce(0, 0), U256::ZERO, U256::ZERO, &first);
    let sig_second = sign_relay_call(&key, nonce(0, 1), U256::ZERO, U256::ZERO, &second);

    let signatures = [sig_first.as_slice(), sig_second.as_slice()];
    let payloads = [first.as_slice(), second.as_slice()];
    let nonces = [nonce(0, 0), nonce(0, 1)];

    assert_eq!(
        h.transact(U256::ZERO, |km| km.execute_relay_call_batch(
            U256::ZERO,
            &signatures,
            &nonces,
            &[U256::ZERO],
            &[U256::ZERO, U256::ZERO],
            &payloads,
        )),
        Err(KeyManagerError::BatchExecuteRelayCallParamsLengthMismatch(
            BatchExecuteRelayCallParamsLengthMismatch {}
        ))
    );
    assert!(matches!(
        h.transact(wei(1), |km| km.execute_relay_call_batch(
            wei(1),
            &signatures,
            &nonces,
            &[U256::ZERO, U256::ZERO],
            &[U256::ZERO, U256::ZERO],
            &payloads,
        )),
        Err(KeyManagerError::BatchExcessiveValueSent(_))
    ));

    h.transact(U256::ZERO, |km| {
        km.execute_relay_call_batch(
            U256::ZERO,
            &signatures,
            &nonces,
            &[U256::ZERO, U256::ZERO],
            &[U256::ZERO, U256::ZERO],
            &payloads,
        )
    })
    .unwrap();
    assert_eq!(h.data(NOTE_KEY), b"two");
    assert_eq!(h.get_nonce(signer, 0), nonce(0, 2));
    assert_eq!(h.events.len(), 2);
}

#[test]
fn get_nonce_rejects_wide_channel_ids() {
    let (mut h, _, signer) = relayer_harness();
    let too_wide = U256::from(1u8) << 128;
    assert!(matches!(
        h.transact(U256::ZERO, |km| km.get_nonce(signer, too_wide)),
        Err(KeyManagerError::ChannelIdOverflow(_))
    ));
}
