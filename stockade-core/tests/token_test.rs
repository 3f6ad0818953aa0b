//! Access token behavior tests

use chrono::Duration;
use stockade_core::{AccessClaims, Error, Role, TokenSigner};

fn signer() -> TokenSigner {
    TokenSigner::new("integration-test-secret", Duration::hours(1))
}

#[test]
fn test_claims_survive_roundtrip() {
    let token = signer()
        .mint(42, "carol@example.com", Role::Customer, "company_abc123")
        .unwrap();

    let claims: AccessClaims = signer().verify(&token).unwrap();
    assert_eq!(claims.user_id, 42);
    assert_eq!(claims.email, "carol@example.com");
    assert_eq!(claims.role, Role::Customer);
    assert_eq!(claims.company_id, "company_abc123");
}

#[test]
fn test_tampered_payload_rejected() {
    let token = signer()
        .mint(42, "carol@example.com", Role::Customer, "company_abc123")
        .unwrap();

    // Splice the payload of a token claiming Admin onto the original
    // signature; the signature check must fail.
    let admin_token = signer()
        .mint(42, "carol@example.com", Role::Admin, "company_abc123")
        .unwrap();
    let original: Vec<&str> = token.split('.').collect();
    let elevated: Vec<&str> = admin_token.split('.').collect();
    let spliced = format!("{}.{}.{}", elevated[0], elevated[1], original[2]);

    assert!(matches!(
        signer().verify(&spliced),
        Err(Error::SignatureVerificationFailed)
    ));
}

#[test]
fn test_garbage_token_rejected() {
    assert!(matches!(
        signer().verify("not-a-token"),
        Err(Error::InvalidToken(_))
    ));
    assert!(signer().verify("").is_err());
}

#[test]
fn test_expiry_is_embedded() {
    // A token minted already-expired fails verification even though the
    // signature is genuine.
    let expired = TokenSigner::new("integration-test-secret", Duration::seconds(-1))
        .mint(1, "dave@example.com", Role::Clerk, "company_abc123")
        .unwrap();

    assert!(matches!(signer().verify(&expired), Err(Error::TokenExpired)));
}
