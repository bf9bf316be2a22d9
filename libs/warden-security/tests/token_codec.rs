#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Token codec behaviour across every supported transformation.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{Duration, Utc};
use warden_security::{
    CipherMode, KeySize, Padding, TokenCodec, TokenCodecConfig, TokenData, TokenError, TokenType,
};

const TRANSFORMATIONS: &[&str] = &[
    "AES/ECB/PKCS5Padding",
    "AES/ECB/NoPadding",
    "AES/CBC/PKCS5Padding",
    "AES/CBC/NoPadding",
    "AES/GCM/NoPadding",
];

const KEY_SIZES: &[Option<u32>] = &[None, Some(128), Some(192), Some(256)];

fn codec(algorithm: &str, key_size: Option<u32>) -> TokenCodec {
    TokenCodec::new(&TokenCodecConfig {
        algorithm: algorithm.to_owned(),
        key_size,
    })
    .unwrap()
}

#[test]
fn default_codec_is_aes128_ecb_pkcs5() {
    let codec = TokenCodec::new(&TokenCodecConfig::default()).unwrap();
    assert_eq!(codec.spec().mode, CipherMode::Ecb);
    assert_eq!(codec.spec().padding, Padding::Pkcs5);
    assert_eq!(codec.key_size(), KeySize::Aes128);
}

#[test]
fn round_trip_for_every_transformation_and_key_size() {
    for algorithm in TRANSFORMATIONS {
        for key_size in KEY_SIZES {
            let codec = codec(algorithm, *key_size);
            let data = TokenData::new("alice", TokenType::Access, Duration::hours(3)).unwrap();

            let token = codec.encrypt_token(&data).unwrap();
            let decoded = codec.decrypt_token(&token).unwrap();

            assert_eq!(decoded, data, "{algorithm} / {key_size:?}");
            assert!(decoded.is_valid());
        }
    }
}

#[test]
fn usernames_survive_unchanged() {
    let codec = codec("AES/ECB/NoPadding", None);
    for user in ["a", "exactly-sixteen!", "user with spaces", "\u{e9}l\u{e8}ve", ""] {
        let data = TokenData::new(user, TokenType::Access, Duration::minutes(1)).unwrap();
        let token = codec.encrypt_token(&data).unwrap();
        assert_eq!(codec.decrypt_token(&token).unwrap().user, user);
    }
}

#[test]
fn expired_token_decrypts_but_fails_verification() {
    let codec = codec("AES/ECB/PKCS5Padding", None);
    let data = TokenData::issued_at(
        "alice",
        TokenType::Access,
        Utc::now() - Duration::hours(2),
        Duration::hours(1),
    )
    .unwrap();

    let token = codec.encrypt_token(&data).unwrap();

    let decoded = codec.decrypt_token(&token).unwrap();
    assert!(!decoded.is_valid());
    assert_eq!(
        codec.verify(&token).unwrap_err(),
        TokenError::Expired {
            valid_before: data.valid_before
        }
    );
}

#[test]
fn verify_accepts_live_token() {
    let codec = codec("AES/GCM/NoPadding", Some(256));
    let token = codec
        .issue("alice", TokenType::Access, Duration::hours(3))
        .unwrap();
    assert_eq!(codec.verify(&token.data).unwrap().user, "alice");
}

#[test]
fn any_single_byte_corruption_is_rejected() {
    for algorithm in TRANSFORMATIONS {
        let codec = codec(algorithm, Some(256));
        let data = TokenData::new("alice", TokenType::Access, Duration::hours(1)).unwrap();
        let raw = STANDARD
            .decode(codec.encrypt_token(&data).unwrap())
            .unwrap();

        for index in 0..raw.len() {
            let mut corrupted = raw.clone();
            corrupted[index] ^= 0x5a;
            let result = codec.decrypt_token(&STANDARD.encode(&corrupted));
            assert!(
                matches!(result, Err(TokenError::InvalidToken(_))),
                "{algorithm}: flipping byte {index} was not detected"
            );
        }
    }
}

#[test]
fn truncated_and_extended_ciphertext_is_rejected() {
    for algorithm in TRANSFORMATIONS {
        let codec = codec(algorithm, None);
        let raw = STANDARD
            .decode(
                codec
                    .encrypt_token(&TokenData::new("alice", TokenType::Access, Duration::hours(1)).unwrap())
                    .unwrap(),
            )
            .unwrap();

        let truncated = &raw[..raw.len() - 16];
        assert!(codec.decrypt_token(&STANDARD.encode(truncated)).is_err(), "{algorithm}");

        let mut extended = raw.clone();
        extended.extend_from_slice(&[0u8; 16]);
        assert!(codec.decrypt_token(&STANDARD.encode(&extended)).is_err(), "{algorithm}");
    }
}

#[test]
fn repeated_encryption_decrypts_to_equal_data() {
    for algorithm in TRANSFORMATIONS {
        let codec = codec(algorithm, None);
        let data = TokenData::new("alice", TokenType::Access, Duration::hours(1)).unwrap();

        let first = codec.encrypt_token(&data).unwrap();
        let second = codec.encrypt_token(&data).unwrap();

        assert_eq!(
            codec.decrypt_token(&first).unwrap(),
            codec.decrypt_token(&second).unwrap(),
            "{algorithm}"
        );
    }
}

#[test]
fn deterministic_modes_produce_identical_ciphertext() {
    let ecb = codec("AES/ECB/PKCS5Padding", None);
    let data = TokenData::new("alice", TokenType::Access, Duration::hours(1)).unwrap();
    assert_eq!(
        ecb.encrypt_token(&data).unwrap(),
        ecb.encrypt_token(&data).unwrap()
    );

    let gcm = codec("AES/GCM/NoPadding", None);
    assert_ne!(
        gcm.encrypt_token(&data).unwrap(),
        gcm.encrypt_token(&data).unwrap()
    );
}

#[test]
fn tokens_do_not_cross_codec_instances() {
    let issuer = codec("AES/ECB/PKCS5Padding", None);
    let other = codec("AES/ECB/PKCS5Padding", None);

    let token = issuer
        .encrypt_token(&TokenData::new("alice", TokenType::Access, Duration::hours(1)).unwrap())
        .unwrap();

    assert!(matches!(
        other.decrypt_token(&token),
        Err(TokenError::InvalidToken(_))
    ));
}

#[test]
fn malformed_input_is_invalid_token() {
    let codec = codec("AES/ECB/PKCS5Padding", None);
    for input in ["", "not base64!!", "AAAA", "YWxpY2U=", "====", &"A".repeat(43)] {
        assert!(
            matches!(codec.decrypt_token(input), Err(TokenError::InvalidToken(_))),
            "{input:?}"
        );
    }
}

#[test]
fn invalid_configuration_is_rejected() {
    for (algorithm, key_size) in [
        ("Blowfish", None),
        ("AES/XTS/NoPadding", None),
        ("AES/GCM/PKCS5Padding", None),
        ("AES/ECB/PKCS5Padding", Some(64)),
        ("AES/ECB/PKCS5Padding", Some(512)),
    ] {
        let result = TokenCodec::new(&TokenCodecConfig {
            algorithm: algorithm.to_owned(),
            key_size,
        });
        assert!(
            matches!(result, Err(TokenError::Configuration(_))),
            "{algorithm} / {key_size:?}"
        );
    }
}

#[test]
fn issued_tokens_have_unique_ids_and_payloads() {
    let codec = codec("AES/CBC/PKCS5Padding", Some(128));
    let a = codec.issue("alice", TokenType::Access, Duration::hours(3)).unwrap();
    let b = codec.issue("alice", TokenType::Access, Duration::hours(3)).unwrap();

    assert_ne!(a.id, b.id);
    assert_ne!(a.data, b.data);
    assert_eq!(a.metadata.valid_before - a.metadata.created, Duration::hours(3));
}

#[test]
fn token_kind_survives_every_transformation() {
    for algorithm in TRANSFORMATIONS {
        let codec = codec(algorithm, None);
        for kind in [TokenType::Access, TokenType::Refresh, TokenType::Xsrf] {
            let token = codec.issue("alice", kind, Duration::hours(1)).unwrap();
            assert_eq!(codec.verify_kind(&token.data, kind).unwrap().kind, kind);
        }
        let xsrf = codec.issue("alice", TokenType::Xsrf, Duration::hours(1)).unwrap();
        assert!(matches!(
            codec.verify_kind(&xsrf.data, TokenType::Access),
            Err(TokenError::InvalidToken(_))
        ));
    }
}
