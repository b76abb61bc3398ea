//! Integration test for JWT auth validation.
//!
//! Tokens are minted locally with the same HS256 secret the server uses and
//! run through `validate_token`. No running server or database is needed.
//!
//! Run with: `cargo test --test auth_test`
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use portfolio_review::auth::jwt::{AuthError, Claims, UserMetadata, validate_token};

const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

fn sign(claims: &Claims) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}

fn mint_test_token(sub: &str, email: &str, full_name: &str) -> String {
    let now = Utc::now().timestamp() as usize;

    sign(&Claims {
        sub: sub.to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: Some("https://auth.example.com".to_string()),
        email: Some(email.to_string()),
        user_metadata: Some(UserMetadata {
            full_name: Some(full_name.to_string()),
            name: None,
            email: Some(email.to_string()),
        }),
    })
}

fn token_error_kind(err: AuthError) -> ErrorKind {
    match err {
        AuthError::Token(e) => e.into_kind(),
        other => panic!("expected a token error, got {other:?}"),
    }
}

#[test]
fn test_valid_token_decodes_correctly() {
    let user_id = Uuid::new_v4();
    let token = mint_test_token(&user_id.to_string(), "alice@example.com", "Alice Smith");

    let claims = validate_token(&token, TEST_SECRET).expect("Token should be valid");

    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.user_email().unwrap(), "alice@example.com");
    assert_eq!(claims.display_name().unwrap(), "Alice Smith");
    assert_eq!(claims.user_id().unwrap(), user_id);
}

#[test]
fn test_expired_token_is_rejected() {
    let now = Utc::now().timestamp() as usize;

    let token = sign(&Claims {
        sub: Uuid::new_v4().to_string(),
        exp: now - 300, // well past the 60s default leeway
        iat: Some(now - 3600),
        iss: None,
        email: Some("expired@example.com".to_string()),
        user_metadata: None,
    });

    let err = validate_token(&token, TEST_SECRET).unwrap_err();
    assert!(matches!(token_error_kind(err), ErrorKind::ExpiredSignature));
}

#[test]
fn test_wrong_secret_is_rejected() {
    let token = mint_test_token(&Uuid::new_v4().to_string(), "bob@example.com", "Bob Jones");

    let err = validate_token(&token, "completely-wrong-secret-xxxxxxxxxxxxxxxxxxx").unwrap_err();
    assert!(matches!(token_error_kind(err), ErrorKind::InvalidSignature));
}

#[test]
fn test_garbage_token_is_rejected() {
    let result = validate_token("not.a.valid.jwt", TEST_SECRET);
    assert!(matches!(result, Err(AuthError::Token(_))));
}

#[test]
fn test_non_uuid_subject_is_rejected() {
    let token = mint_test_token("not-a-uuid", "carol@example.com", "Carol");

    let claims = validate_token(&token, TEST_SECRET).expect("signature is fine");
    assert!(matches!(claims.user_id(), Err(AuthError::Subject(_))));
}

#[test]
fn test_claims_helpers_with_missing_metadata() {
    let now = Utc::now().timestamp() as usize;

    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: None,
        email: Some("bare@example.com".to_string()),
        user_metadata: None,
    };

    // Falls back to the top-level email.
    assert_eq!(claims.user_email().unwrap(), "bare@example.com");
    assert!(claims.display_name().is_none());
}

#[test]
fn test_missing_email_is_an_error() {
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        exp: 0,
        iat: None,
        iss: None,
        email: None,
        user_metadata: Some(UserMetadata {
            full_name: None,
            name: Some("dave".to_string()),
            email: None,
        }),
    };

    assert!(matches!(claims.user_email(), Err(AuthError::MissingEmail)));
    assert_eq!(claims.display_name().as_deref(), Some("dave"));
}
