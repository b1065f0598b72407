#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256, fixed_bytes, Address, Bytes, U256};
    use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

    use lsp6_key_manager_types::{
        keys::{allowed_calls_key, allowed_data_keys_key, array_index_key, permissions_key, ADDRESS_PERMISSIONS_ARRAY},
        relay::relay_call_digest,
        AllowedCalls, AllowedDataKeys, CallTypes, OperationType, Permissions, ValidityTimestamps, ANY_ADDRESS,
    };

    use crate::{
        bundle::{update_bundle, Section},
        config::{AllowedCallConfig, ControllerConfig, SetupFile},
        encoder::{encode_allowed_calls, encode_permissions, encode_permissions_setup, execute_payload},
        error::EncoderError,
        signer::{relay_digest, sign_relay_call, signer_address},
    };

    const KEY_MANAGER: Address = address!("00000000000000000000000000000000000006c6");
    const CONTROLLER: Address = address!("000000000000000000000000000000000000c0de");
    const TOKEN: Address = address!("0000000000000000000000000000000000000771");

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_encode_permissions() {
        assert_eq!(
            encode_permissions(&names(&["CALL", "transfervalue"])).unwrap(),
            Permissions::CALL | Permissions::TRANSFERVALUE
        );
        assert_eq!(
            encode_permissions(&names(&["ALL_PERMISSIONS", "SUPER_DELEGATECALL"])).unwrap(),
            Permissions::ALL_PERMISSIONS | Permissions::SUPER_DELEGATECALL
        );
        assert!(matches!(
            encode_permissions(&names(&["TELEPORT"])),
            Err(EncoderError::UnknownPermission(name)) if name == "TELEPORT"
        ));
    }

    #[test]
    fn test_encode_allowed_calls() {
        let calls = vec![
            AllowedCallConfig {
                call_types: names(&["CALL", "VALUE"]),
                address: Some(TOKEN),
                standard: None,
                function: Some(fixed_bytes!("a9059cbb")),
            },
            AllowedCallConfig {
                call_types: names(&["STATICCALL"]),
                address: None,
                standard: None,
                function: None,
            },
        ];
        let encoded = encode_allowed_calls(&calls).unwrap();
        assert_eq!(encoded.len(), 2 * 34);

        let decoded = AllowedCalls::decode(&encoded).unwrap();
        assert_eq!(decoded.0[0].call_types, CallTypes::CALL.union(CallTypes::VALUE));
        assert_eq!(decoded.0[0].address, TOKEN);
        assert_eq!(decoded.0[0].function, fixed_bytes!("a9059cbb"));
        assert_eq!(decoded.0[1].address, ANY_ADDRESS);

        let bad = vec![AllowedCallConfig {
            call_types: names(&["JUMP"]),
            address: None,
            standard: None,
            function: None,
        }];
        assert!(matches!(encode_allowed_calls(&bad), Err(EncoderError::UnknownCallType(_))));
    }

    #[test]
    fn test_encode_permissions_setup() {
        let setup = SetupFile {
            existing_controllers: 2,
            controllers: vec![ControllerConfig {
                address: CONTROLLER,
                permissions: names(&["SETDATA", "CALL"]),
                allowed_calls: vec![AllowedCallConfig {
                    call_types: names(&["CALL"]),
                    address: Some(TOKEN),
                    standard: None,
                    function: None,
                }],
                allowed_data_keys: vec![Bytes::from(vec![0x4e, 0x6f, 0x74, 0x65])],
            }],
        };

        let entries = encode_permissions_setup(&setup).unwrap();
        assert_eq!(
            entries.keys,
            vec![
                array_index_key(2),
                permissions_key(CONTROLLER),
                allowed_calls_key(CONTROLLER),
                allowed_data_keys_key(CONTROLLER),
                ADDRESS_PERMISSIONS_ARRAY,
            ]
        );
        assert_eq!(entries.values[0], CONTROLLER.to_vec());
        assert_eq!(
            Permissions::from_stored_value(&entries.values[1]),
            Permissions::SETDATA | Permissions::CALL
        );
        let data_keys = AllowedDataKeys::decode(&entries.values[3]).unwrap();
        assert_eq!(data_keys.0[0].as_bytes(), b"Note");
        assert_eq!(entries.values[4], 3u128.to_be_bytes().to_vec());
    }

    #[test]
    fn test_setup_file_from_json() {
        let raw = r#"{
            "controllers": [{
                "address": "0x000000000000000000000000000000000000c0de",
                "permissions": ["SIGN"]
            }]
        }"#;
        let setup: SetupFile = serde_json::from_str(raw).unwrap();
        assert_eq!(setup.existing_controllers, 0);
        let entries = encode_permissions_setup(&setup).unwrap();
        assert_eq!(entries.len(), 3);

        let empty = r#"{ "controllers": [{ "address": "0x000000000000000000000000000000000000c0de", "permissions": [] }] }"#;
        let setup: SetupFile = serde_json::from_str(empty).unwrap();
        assert!(matches!(
            encode_permissions_setup(&setup),
            Err(EncoderError::EmptyPermissions(_))
        ));
    }

    #[test]
    fn test_relay_digest_matches_key_manager() {
        let payload = execute_payload(OperationType::Call, TOKEN, U256::from(5u8), &[]);
        let nonce = (U256::from(3u8) << 128) | U256::from(9u8);
        let validity = U256::from(1_700_000_100u64);
        assert_eq!(
            relay_digest(KEY_MANAGER, 4201, nonce, validity, U256::from(5u8), &payload),
            relay_call_digest(KEY_MANAGER, 4201, nonce, validity, U256::from(5u8), &payload)
        );
    }

    #[test]
    fn test_sign_relay_call_recovers_signer() {
        let signing_key = SigningKey::from_slice(&[7u8; 32]).unwrap();
        let payload = execute_payload(OperationType::Call, TOKEN, U256::ZERO, &[]);
        let validity = ValidityTimestamps { start: 0, end: 1_800_000_000 };

        let signed = sign_relay_call(&signing_key, KEY_MANAGER, 4201, 3, 9, validity, U256::ZERO, &payload).unwrap();
        assert_eq!(signed.signer, signer_address(&signing_key));
        assert_eq!(signed.nonce, (U256::from(3u8) << 128) | U256::from(9u8));

        let sig = hex::decode(signed.signature.trim_start_matches("0x")).unwrap();
        assert_eq!(sig.len(), 65);
        assert!(sig[64] == 27 || sig[64] == 28);

        let digest = relay_call_digest(KEY_MANAGER, 4201, signed.nonce, validity.to_word(), U256::ZERO, &payload);
        let recovered = VerifyingKey::recover_from_prehash(
            digest.as_slice(),
            &Signature::from_slice(&sig[..64]).unwrap(),
            RecoveryId::from_byte(sig[64] - 27).unwrap(),
        )
        .unwrap();
        assert_eq!(&recovered, signing_key.verifying_key());
    }

    #[test]
    fn test_signer_address_is_keccak_of_public_key() {
        // secret key 1 is the generator point
        let signing_key = SigningKey::from_slice(&b256!("0000000000000000000000000000000000000000000000000000000000000001")[..]).unwrap();
        assert_eq!(signer_address(&signing_key), address!("7e5f4552091a69125d5dfcb7b8c2659029395bdf"));
    }

    #[test]
    fn test_bundle_collects_relay_calls_in_order() {
        let dir = std::env::temp_dir().join(format!("lsp6-encoder-bundle-{}", std::process::id()));
        let path = dir.join("bundle.json");
        let _ = std::fs::remove_file(&path);

        let key = SigningKey::from_slice(&[7u8; 32]).unwrap();
        let payload = execute_payload(OperationType::Call, TOKEN, U256::ZERO, &[]);
        let sign = |sequence| {
            let signed = sign_relay_call(&key, KEY_MANAGER, 4201, 0, sequence, ValidityTimestamps::default(), U256::ZERO, &payload)
                .unwrap();
            serde_json::to_value(&signed).unwrap()
        };

        assert_eq!(update_bundle(&path, Section::RelayCalls, sign(0)).unwrap(), 1);
        assert_eq!(update_bundle(&path, Section::RelayCalls, sign(1)).unwrap(), 2);
        assert!(matches!(
            update_bundle(&path, Section::RelayCalls, sign(1)),
            Err(EncoderError::Bundle(_))
        ));
        assert_eq!(
            update_bundle(&path, Section::Setup, serde_json::json!({ "payload": "0x" })).unwrap(),
            2
        );

        let bundle: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let calls = bundle["relayCalls"].as_array().unwrap();
        assert_eq!(calls[0]["nonce"], serde_json::to_value(U256::ZERO).unwrap());
        assert_eq!(calls[1]["nonce"], serde_json::to_value(U256::from(1u8)).unwrap());
        assert_eq!(bundle["setup"]["payload"], "0x");
        assert!(!dir.join("bundle.json.partial").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
