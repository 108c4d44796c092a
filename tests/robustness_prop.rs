use guactoken::payload::{AuthorizationPayload, ConnectionSpec, Protocol};
use guactoken::{EncryptedCodec, SecretKey, SignedCodec, TokenCodec, TokenError};
use proptest::prelude::*;

mod common;
use common::{key, now};

fn protocols() -> impl Strategy<Value = Protocol> {
    prop_oneof![
        Just(Protocol::Vnc),
        Just(Protocol::Rdp),
        Just(Protocol::Ssh),
        Just(Protocol::Telnet),
        Just(Protocol::Kubernetes),
    ]
}

fn connection_specs() -> impl Strategy<Value = ConnectionSpec> {
    (
        protocols(),
        proptest::collection::btree_map("[a-z-]{1,16}", ".{0,32}", 0..6),
    )
        .prop_map(|(protocol, parameters)| ConnectionSpec {
            protocol,
            parameters,
        })
}

fn payloads() -> impl Strategy<Value = AuthorizationPayload> {
    (
        "[a-zA-Z0-9_.@-]{1,32}",
        // Strictly after `now()` in both milliseconds and seconds.
        1_800_000_000_000i64..=i64::MAX,
        proptest::collection::btree_map("[a-z0-9-]{1,24}", connection_specs(), 0..4),
    )
        .prop_map(|(username, expires, connections)| AuthorizationPayload {
            username,
            expires,
            connections,
        })
}

fn token_strings() -> impl Strategy<Value = String> {
    prop_oneof![
        10 => ".*",
        3 => "[A-Za-z0-9+/=]{0,512}",
        3 => ("[A-Za-z0-9_-]{0,256}", "[A-Za-z0-9_-]{0,256}", "[A-Za-z0-9_-]{0,64}")
            .prop_map(|(a, b, c)| format!("{a}.{b}.{c}")),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        rng_algorithm: proptest::test_runner::RngAlgorithm::ChaCha,
        rng_seed: proptest::test_runner::RngSeed::Fixed(0x6A_CA_40),
        .. ProptestConfig::default()
    })]

    #[test]
    fn encrypted_roundtrip(payload in payloads()) {
        let codec = EncryptedCodec::with_zero_iv(key()).unwrap();
        let token = codec.encode(&payload).unwrap();
        prop_assert_eq!(codec.decode_at(&token, now()).unwrap(), payload);
    }

    #[test]
    fn signed_roundtrip(payload in payloads(), secret in proptest::collection::vec(any::<u8>(), 1..96)) {
        let codec = SignedCodec::new(SecretKey::from_bytes(secret)).unwrap();
        let token = codec.encode(&payload).unwrap();
        prop_assert_eq!(codec.decode_at(&token, now()).unwrap(), payload);
    }

    #[test]
    fn encrypted_key_mismatch_rejected(payload in payloads(), other in proptest::array::uniform16(any::<u8>())) {
        prop_assume!(other.as_slice() != key().as_bytes());
        let issuer = EncryptedCodec::with_zero_iv(key()).unwrap();
        let verifier = EncryptedCodec::with_zero_iv(SecretKey::from_bytes(other.to_vec())).unwrap();
        let token = issuer.encode(&payload).unwrap();
        let result = verifier.decode_at(&token, now());
        prop_assert!(
            matches!(result, Err(TokenError::SignatureMismatch) | Err(TokenError::PaddingError)),
            "got {:?}",
            result
        );
    }

    #[test]
    fn decoders_never_panic(token in token_strings()) {
        let encrypted = EncryptedCodec::with_zero_iv(key()).unwrap();
        let signed = SignedCodec::new(key()).unwrap();

        let res = std::panic::catch_unwind(|| encrypted.decode_at(&token, now()));
        prop_assert!(res.is_ok(), "encrypted decode panicked (len={})", token.len());
        prop_assert!(res.unwrap().is_err());

        let res = std::panic::catch_unwind(|| signed.decode_at(&token, now()));
        prop_assert!(res.is_ok(), "signed decode panicked (len={})", token.len());
        prop_assert!(res.unwrap().is_err());
    }
}

#[test]
fn extremely_long_inputs_are_rejected() {
    let seg = "x".repeat(200_000);
    let token = format!("{seg}.{seg}.{seg}");

    let encrypted = EncryptedCodec::with_zero_iv(key()).unwrap();
    let signed = SignedCodec::new(key()).unwrap();
    assert!(matches!(
        encrypted.decode_at(&token, now()),
        Err(TokenError::MalformedToken(_))
    ));
    assert!(matches!(
        signed.decode_at(&token, now()),
        Err(TokenError::MalformedToken(_))
    ));
}
