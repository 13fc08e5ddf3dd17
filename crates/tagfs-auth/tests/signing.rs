//! End-to-end signing and verification.

#![allow(clippy::unwrap_used)]

use assert_matches::assert_matches;
use proptest::prelude::*;
use std::time::Duration;
use tagfs_auth::{
    sign, signing_string, verify_signature, AuthError, AuthHeader, Identity, Signer, StaticKeys,
    Verifier, DEFAULT_WINDOW,
};
use tagfs_testkit::{init_test_tracing, FixedClock, TEST_SEED_HEX};

const T: u64 = 1_700_000_000;

fn identity() -> Identity {
    Identity::from_hex_seed(6, TEST_SEED_HEX).unwrap()
}

#[test]
fn test_header_for_known_identity() {
    let credential = sign(&identity(), T, DEFAULT_WINDOW);
    let header = credential.to_header();

    assert!(header.starts_with(r#"Signature keyId="6",algorithm="ed25519","#));
    assert!(header.contains(r#"created="1700000000""#));
    assert!(header.contains(r#"expires="1700000003""#));
    assert!(header.contains(r#"headers="(created) (expires) (key-id)""#));

    let message = "(created): 1700000000\n(expires): 1700000003\n(key-id): 6";
    assert_eq!(credential.signing_string(), message);

    let key = identity().verifying_key();
    assert!(verify_signature(&key, message.as_bytes(), &credential.signature).is_ok());

    let mut tampered = message.as_bytes().to_vec();
    tampered[0] ^= 0x01;
    assert_matches!(
        verify_signature(&key, &tampered, &credential.signature),
        Err(AuthError::InvalidSignature { .. })
    );
}

#[test]
fn test_header_parses_back() {
    let credential = sign(&identity(), T, Duration::from_secs(10));
    let header: AuthHeader = credential.to_header().parse().unwrap();

    assert_eq!(header.key_id, 6);
    assert_eq!(header.created, Some(T));
    assert_eq!(header.expires, Some(T + 10));
    assert_eq!(header.signing_string().unwrap(), credential.signing_string());
    assert_eq!(header.decode_signature().unwrap(), credential.signature);
}

#[tokio::test]
async fn test_signer_and_verifier_share_a_clock() {
    init_test_tracing();
    let clock = FixedClock::new(T);
    let signer = Signer::new(identity()).with_clock(clock.clone());
    let verifier =
        Verifier::new(StaticKeys::new().with_identity(signer.identity())).with_clock(clock.clone());

    let header = signer.authorization_header();
    let verified = verifier.verify(&header).await.unwrap();
    assert_eq!(verified.key_id, 6);
    assert_eq!(verified.created, T);
    assert_eq!(verified.expires, T + 3);

    clock.advance(3);
    assert!(verifier.verify(&header).await.is_ok());

    clock.advance(1);
    assert_eq!(
        verifier.verify(&header).await.unwrap_err(),
        AuthError::ClockSkew {
            now: T + 4,
            created: T,
            expires: T + 3,
        }
    );

    // a fresh credential from the same signer is accepted again
    assert!(verifier.verify(&signer.authorization_header()).await.is_ok());
}

#[tokio::test]
async fn test_future_dated_credential_is_rejected() {
    let clock = FixedClock::new(T);
    let verifier =
        Verifier::new(StaticKeys::new().with_identity(&identity())).with_clock(clock.clone());

    let header = sign(&identity(), T + 60, DEFAULT_WINDOW).to_header();
    assert_matches!(
        verifier.verify(&header).await,
        Err(AuthError::ClockSkew { now, .. }) if now == T
    );
}

#[tokio::test]
async fn test_unknown_key_id() {
    let verifier = Verifier::new(StaticKeys::new()).with_clock(FixedClock::new(T));
    let header = sign(&identity(), T, DEFAULT_WINDOW).to_header();

    assert_eq!(
        verifier.verify(&header).await.unwrap_err(),
        AuthError::UnknownKey { key_id: 6 }
    );
}

#[tokio::test]
async fn test_wrong_key_for_id() {
    let other = Identity::from_seed(6, &[7u8; 32]).unwrap();
    let verifier = Verifier::new(StaticKeys::new().with(6, other.verifying_key()))
        .with_clock(FixedClock::new(T));
    let header = sign(&identity(), T, DEFAULT_WINDOW).to_header();

    assert_matches!(
        verifier.verify(&header).await,
        Err(AuthError::InvalidSignature { .. })
    );
}

#[tokio::test]
async fn test_tampered_header_fails() {
    let verifier = Verifier::new(StaticKeys::new().with_identity(&identity()))
        .with_clock(FixedClock::new(T + 1));
    let header = sign(&identity(), T, DEFAULT_WINDOW).to_header();

    // stretching the window invalidates the signature
    let stretched = header.replace(r#"expires="1700000003""#, r#"expires="1700009999""#);
    assert_matches!(
        verifier.verify(&stretched).await,
        Err(AuthError::InvalidSignature { .. })
    );

    // dropping a signed timestamp from the covered list is refused outright
    let uncovered = header.replace("(created) (expires) (key-id)", "(created) (key-id)");
    assert_matches!(
        verifier.verify(&uncovered).await,
        Err(AuthError::MalformedHeader { .. })
    );

    let wrong_scheme = header.replacen("Signature ", "Bearer ", 1);
    assert_matches!(
        verifier.verify(&wrong_scheme).await,
        Err(AuthError::MalformedHeader { .. })
    );

    let wrong_algorithm = header.replace(r#"algorithm="ed25519""#, r#"algorithm="rsa-sha256""#);
    assert_matches!(
        verifier.verify(&wrong_algorithm).await,
        Err(AuthError::UnsupportedAlgorithm { .. })
    );
}

#[tokio::test]
async fn test_unpadded_and_legacy_label_accepted() {
    let verifier = Verifier::new(StaticKeys::new().with_identity(&identity()))
        .with_clock(FixedClock::new(T));
    let header = sign(&identity(), T, DEFAULT_WINDOW).to_header();

    // 64 signature bytes always encode with two padding characters
    assert!(header.ends_with(r#"==""#));
    let unpadded = format!("{}\"", &header[..header.len() - 3]);
    assert!(verifier.verify(&unpadded).await.is_ok());

    let legacy = header.replace(r#"algorithm="ed25519""#, r#"algorithm="hs2019""#);
    assert!(verifier.verify(&legacy).await.is_ok());
}

#[test]
fn test_signing_is_deterministic() {
    let a = sign(&identity(), T, DEFAULT_WINDOW);
    let b = sign(&identity(), T, DEFAULT_WINDOW);
    assert_eq!(a, b);
    assert_ne!(a, sign(&identity(), T + 1, DEFAULT_WINDOW));
}

proptest! {
    #[test]
    fn prop_valid_exactly_within_window(
        created in 1_000u64..1_000_000,
        window in 0u64..30,
        offset in -40i64..40,
    ) {
        let identity = identity();
        let credential = sign(&identity, created, Duration::from_secs(window));
        let now = created.saturating_add_signed(offset);
        let inside = now >= created && now <= created + window;

        let result = credential.verify(&identity.verifying_key(), now);
        prop_assert_eq!(result.is_ok(), inside);
        if !inside {
            prop_assert!(
                matches!(result, Err(AuthError::ClockSkew { .. })),
                "expected clock skew"
            );
        }
    }

    #[test]
    fn prop_signing_string_matches_credential(created in any::<u32>(), key_id in any::<u64>()) {
        let identity = Identity::from_hex_seed(key_id, TEST_SEED_HEX).unwrap();
        let credential = sign(&identity, u64::from(created), DEFAULT_WINDOW);
        prop_assert_eq!(
            credential.signing_string(),
            signing_string(u64::from(created), u64::from(created) + 3, key_id)
        );
    }
}
