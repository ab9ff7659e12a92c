use std::sync::atomic::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;

use paddock_auth_types::token::SessionJwtVerifier;
use paddock_domain::id::ExternalId;
use paddock_web::domain::provider::CredentialKind;
use paddock_web::usecase::session::{AuthOutcome, AuthenticateSessionUseCase};

use crate::helpers::{FakeProvider, TEST_JWT_SECRET};

#[derive(Serialize)]
struct Claims<'a> {
    sub: &'a str,
    iat: u64,
    exp: u64,
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Session JWT issued now, expiring at `exp`.
fn session_jwt(sub: &str, exp: u64) -> String {
    issued_jwt(sub, now(), exp)
}

fn issued_jwt(sub: &str, iat: u64, exp: u64) -> String {
    encode(
        &Header::default(),
        &Claims { sub, iat, exp },
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn authenticator<'a>(
    provider: &'a FakeProvider,
    verifier: Option<&'a SessionJwtVerifier>,
) -> AuthenticateSessionUseCase<'a> {
    AuthenticateSessionUseCase {
        provider,
        verifier,
        credential_kind: CredentialKind::Token,
    }
}

#[tokio::test]
async fn should_be_unauthenticated_without_credential() {
    let provider = FakeProvider::new();
    let auth = authenticator(&provider, None);

    assert_eq!(auth.execute(None).await, AuthOutcome::Unauthenticated);
    assert_eq!(auth.execute(Some("")).await, AuthOutcome::Unauthenticated);
    assert_eq!(provider.validations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn should_authenticate_and_return_rotated_credential() {
    let provider = FakeProvider::new();
    provider.add_session("sess-1", "ext-1");

    let outcome = authenticator(&provider, None).execute(Some("sess-1")).await;

    let AuthOutcome::Authenticated(session) = outcome else {
        panic!("expected authenticated, got {outcome:?}");
    };
    assert_eq!(session.external_id, ExternalId::from("ext-1"));
    assert_ne!(session.credential, "sess-1");
    assert!(provider.is_session(&session.credential));
}

#[tokio::test]
async fn should_be_invalid_for_unknown_credential() {
    let provider = FakeProvider::new();

    let outcome = authenticator(&provider, None).execute(Some("forged")).await;

    assert_eq!(outcome, AuthOutcome::Invalid);
}

#[tokio::test]
async fn should_fail_closed_when_provider_errors() {
    let provider = FakeProvider::new();
    provider.add_session("sess-1", "ext-1");
    provider.fail_validate.store(true, Ordering::SeqCst);

    let outcome = authenticator(&provider, None).execute(Some("sess-1")).await;

    assert_eq!(outcome, AuthOutcome::Invalid);
}

#[tokio::test(start_paused = true)]
async fn should_fail_closed_when_provider_hangs() {
    let provider = FakeProvider::new();
    provider.add_session("sess-1", "ext-1");
    provider.hang_validate.store(true, Ordering::SeqCst);

    let outcome = authenticator(&provider, None).execute(Some("sess-1")).await;

    assert_eq!(outcome, AuthOutcome::Invalid);
}

#[tokio::test]
async fn should_accept_fresh_jwt_without_provider_call() {
    let provider = FakeProvider::new();
    let verifier = SessionJwtVerifier::from_secret(TEST_JWT_SECRET.as_bytes(), None);
    let jwt = session_jwt("ext-1", now() + 300);

    let outcome = authenticator(&provider, Some(&verifier))
        .execute(Some(&jwt))
        .await;

    let AuthOutcome::Authenticated(session) = outcome else {
        panic!("expected authenticated, got {outcome:?}");
    };
    assert_eq!(session.external_id, ExternalId::from("ext-1"));
    assert_eq!(session.credential, jwt);
    assert_eq!(provider.validations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn should_ask_provider_once_local_jwt_expired() {
    let provider = FakeProvider::new();
    let verifier = SessionJwtVerifier::from_secret(TEST_JWT_SECRET.as_bytes(), None);
    let jwt = issued_jwt("ext-1", now() - 360, now() - 60);
    provider.add_session(&jwt, "ext-1");

    let outcome = authenticator(&provider, Some(&verifier))
        .execute(Some(&jwt))
        .await;

    assert!(matches!(outcome, AuthOutcome::Authenticated(_)));
    assert_eq!(provider.validations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn should_ask_provider_for_jwt_outside_trust_window() {
    let provider = FakeProvider::new();
    let verifier = SessionJwtVerifier::from_secret(TEST_JWT_SECRET.as_bytes(), None);
    let long_lived = session_jwt("ext-1", now() + 86_400);
    let stale = issued_jwt("ext-1", now() - 600, now() + 60);

    for jwt in [&long_lived, &stale] {
        let outcome = authenticator(&provider, Some(&verifier))
            .execute(Some(jwt))
            .await;
        assert_eq!(outcome, AuthOutcome::Invalid);
    }
    assert_eq!(provider.validations.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn should_rotate_to_provider_credential_once_jwt_leaves_trust_window() {
    let provider = FakeProvider::new();
    let verifier = SessionJwtVerifier::from_secret(TEST_JWT_SECRET.as_bytes(), None);
    let stale = issued_jwt("ext-1", now() - 600, now() + 60);
    provider.add_session(&stale, "ext-1");

    let outcome = authenticator(&provider, Some(&verifier))
        .execute(Some(&stale))
        .await;

    let AuthOutcome::Authenticated(session) = outcome else {
        panic!("expected authenticated, got {outcome:?}");
    };
    assert_ne!(session.credential, stale);
    assert_eq!(provider.validations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn should_reject_expired_jwt_the_provider_no_longer_knows() {
    let provider = FakeProvider::new();
    let verifier = SessionJwtVerifier::from_secret(TEST_JWT_SECRET.as_bytes(), None);
    let jwt = issued_jwt("ext-1", now() - 360, now() - 60);

    let outcome = authenticator(&provider, Some(&verifier))
        .execute(Some(&jwt))
        .await;

    assert_eq!(outcome, AuthOutcome::Invalid);
}

#[tokio::test]
async fn should_not_trust_jwt_signed_with_another_key() {
    let provider = FakeProvider::new();
    let verifier = SessionJwtVerifier::from_secret(b"some-other-secret", None);
    let jwt = session_jwt("ext-1", now() + 300);

    let outcome = authenticator(&provider, Some(&verifier))
        .execute(Some(&jwt))
        .await;

    assert_eq!(outcome, AuthOutcome::Invalid);
    assert_eq!(provider.validations.load(Ordering::SeqCst), 1);
}
