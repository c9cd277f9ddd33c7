//! Authenticator behavior per provider kind.

mod common;

use common::*;
use jwt_security::{
    authenticators::{
        AuthError, Authenticator, AzureADAuthenticator, CustomAuthenticator,
        DefaultAuthenticator, FacebookAuthenticator,
    },
    claims::{ClaimBuilder, IdType},
    models::{AzureADUser, DefaultUser, FacebookUser, TokenResponse},
    services::{InMemoryCredentialStore, JwtService, TokenIssuer},
};
use std::sync::Arc;

fn issuer() -> Arc<dyn TokenIssuer> {
    Arc::new(JwtService::new(&test_settings()).expect("issuer"))
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn default_valid_credential_yields_id_claim_only() {
    let store = InMemoryCredentialStore::new()
        .with_user("alice", "wonderland")
        .unwrap();
    let auth = DefaultAuthenticator::new(store, &test_settings(), issuer());

    let response = auth
        .is_valid_user(Some(DefaultUser::new("alice", "wonderland")))
        .await
        .unwrap();

    assert!(response.is_authenticated());
    assert_eq!(response.token_type, "Bearer");
    assert_eq!(response.expires_in, Some(3600));

    let claims = decode(&response.access_token);
    assert_eq!(identity_pairs(&claims), pairs(&[("name", "alice")]));
}

#[tokio::test]
async fn default_id_claim_follows_configured_id_type() {
    let mut settings = test_settings();
    settings.id_type = IdType::Email;
    let auth = DefaultAuthenticator::new(StaticValidator(true), &settings, issuer());

    let response = auth
        .is_valid_user(Some(DefaultUser::new("alice@example.com", "pw")))
        .await
        .unwrap();

    let claims = decode(&response.access_token);
    assert_eq!(claims.get("email"), Some("alice@example.com"));
    assert_eq!(claims.get("name"), None);
}

#[tokio::test]
async fn default_rejected_credential_is_empty_token_not_error() {
    let store = InMemoryCredentialStore::new()
        .with_user("alice", "wonderland")
        .unwrap();
    let auth = DefaultAuthenticator::new(store, &test_settings(), issuer());

    let response = auth
        .is_valid_user(Some(DefaultUser::new("alice", "wrong")))
        .await
        .unwrap();
    assert!(!response.is_authenticated());
    assert!(response.access_token.is_empty());

    let response = auth.is_valid_user(None).await.unwrap();
    assert!(response.access_token.is_empty());

    let response = auth
        .is_valid_user(Some(DefaultUser::new("", "")))
        .await
        .unwrap();
    assert!(response.access_token.is_empty());
}

#[tokio::test]
async fn default_validate_reports_rejection_reason() {
    let auth = DefaultAuthenticator::new(StaticValidator(false), &test_settings(), issuer());

    let err = auth
        .validate(Some(DefaultUser::new("alice", "pw")))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Rejected(_)));
    assert!(err.is_validation_failure());
}

#[tokio::test]
async fn validator_outage_propagates() {
    let auth = DefaultAuthenticator::new(FailingValidator, &test_settings(), issuer());

    let err = auth
        .is_valid_user(Some(DefaultUser::new("alice", "pw")))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Provider(_)));
}

#[tokio::test]
async fn issuer_failure_propagates() {
    let auth = DefaultAuthenticator::new(StaticValidator(true), &test_settings(), Arc::new(FailingIssuer));

    let err = auth
        .is_valid_user(Some(DefaultUser::new("alice", "pw")))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Issuer(_)));
}

#[tokio::test]
async fn custom_token_carries_exactly_the_declared_claims() {
    let claims = ClaimBuilder::<Employee>::new()
        .add_claim("role", "admin")
        .add_claim_with(IdType::Subject, |e: &Employee| e.email.clone());
    let auth = CustomAuthenticator::new(StaticValidator(true), claims, issuer());

    let response = auth
        .is_valid_user(Some(Employee {
            email: "42".to_string(),
            department: None,
        }))
        .await
        .unwrap();

    let claims = decode(&response.access_token);
    assert_eq!(
        identity_pairs(&claims),
        pairs(&[("role", "admin"), ("sub", "42")])
    );
}

#[tokio::test]
async fn custom_identical_input_gives_identical_claims() {
    let claims = ClaimBuilder::<Employee>::new()
        .add_claim_with(IdType::Email, |e: &Employee| e.email.clone())
        .add_claim(IdType::Role, "staff");
    let auth = CustomAuthenticator::new(StaticValidator(true), claims, issuer());
    let employee = Employee {
        email: "bob@example.com".to_string(),
        department: Some("ops".to_string()),
    };

    let first = auth.is_valid_user(Some(employee.clone())).await.unwrap();
    let second = auth.is_valid_user(Some(employee)).await.unwrap();

    assert_eq!(
        identity_pairs(&decode(&first.access_token)),
        identity_pairs(&decode(&second.access_token))
    );
}

#[tokio::test]
async fn custom_failing_derive_rejects_whole_attempt() {
    let claims = ClaimBuilder::<Employee>::new()
        .add_claim("role", "admin")
        .try_add_claim_with("department", |e: &Employee| {
            e.department
                .clone()
                .ok_or_else(|| anyhow::anyhow!("department not set"))
        });
    let auth = CustomAuthenticator::new(StaticValidator(true), claims, issuer());
    let employee = Employee {
        email: "carol@example.com".to_string(),
        department: None,
    };

    let err = auth.validate(Some(employee.clone())).await.unwrap_err();
    assert!(matches!(err, AuthError::ClaimDerivation(_)));

    let response = auth.is_valid_user(Some(employee)).await.unwrap();
    assert!(response.access_token.is_empty());
}

#[tokio::test]
async fn facebook_valid_token_uses_verified_user_id() {
    let client = Arc::new(MockFacebookClient::valid("fb-1001"));
    let extra = ClaimBuilder::<FacebookUser>::new().add_claim("login_provider", "facebook");
    let auth =
        FacebookAuthenticator::new(&test_settings(), client.clone(), Some(extra), issuer()).unwrap();

    let response = auth
        .is_valid_user(Some(FacebookUser::new("EAAB-user-token")))
        .await
        .unwrap();

    assert_eq!(client.call_count(), 1);
    let claims = decode(&response.access_token);
    assert_eq!(
        identity_pairs(&claims),
        pairs(&[("name", "fb-1001"), ("login_provider", "facebook")])
    );
}

#[tokio::test]
async fn facebook_invalid_or_foreign_token_is_rejected() {
    for client in [
        MockFacebookClient::invalid(),
        MockFacebookClient::for_other_app("fb-1001"),
    ] {
        let auth =
            FacebookAuthenticator::new(&test_settings(), Arc::new(client), None, issuer()).unwrap();
        let response = auth
            .is_valid_user(Some(FacebookUser::new("EAAB-user-token")))
            .await
            .unwrap();
        assert!(response.access_token.is_empty());
    }
}

#[tokio::test]
async fn facebook_empty_token_never_reaches_graph_api() {
    let client = Arc::new(MockFacebookClient::valid("fb-1001"));
    let auth = FacebookAuthenticator::new(&test_settings(), client.clone(), None, issuer()).unwrap();

    let response = auth.is_valid_user(Some(FacebookUser::new(""))).await.unwrap();
    assert!(response.access_token.is_empty());
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn facebook_outage_propagates() {
    let auth = FacebookAuthenticator::new(
        &test_settings(),
        Arc::new(MockFacebookClient::outage()),
        None,
        issuer(),
    )
    .unwrap();

    let err = auth
        .is_valid_user(Some(FacebookUser::new("EAAB-user-token")))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Provider(_)));
}

#[test]
fn facebook_requires_settings() {
    let result = FacebookAuthenticator::new(
        &bare_settings(),
        Arc::new(MockFacebookClient::valid("fb-1")),
        None,
        issuer(),
    );
    assert!(result.is_err());
}

#[tokio::test]
async fn azure_grant_is_returned_as_is() {
    let auth = AzureADAuthenticator::new(Arc::new(MockAzureADClient(AzureBehavior::Grant(
        "azure-access-token".to_string(),
    ))));

    let response = auth.is_valid_user(Some(AzureADUser::default())).await.unwrap();
    assert!(response.is_authenticated);
    assert_eq!(response.access_token, "azure-access-token");
    assert_eq!(response.expires_in, Some(3599));
}

#[tokio::test]
async fn azure_refusal_is_rejection_and_outage_is_error() {
    let refused = AzureADAuthenticator::new(Arc::new(MockAzureADClient(AzureBehavior::Refuse)));
    let response = refused.is_valid_user(None).await.unwrap();
    assert!(!response.is_authenticated);
    assert!(response.access_token.is_empty());

    let down = AzureADAuthenticator::new(Arc::new(MockAzureADClient(AzureBehavior::Outage)));
    assert!(matches!(
        down.is_valid_user(None).await,
        Err(AuthError::Provider(_))
    ));
}

#[test]
fn authenticators_run_outside_an_async_test() {
    let auth = DefaultAuthenticator::new(StaticValidator(true), &test_settings(), issuer());
    let response =
        tokio_test::block_on(auth.is_valid_user(Some(DefaultUser::new("dave", "pw")))).unwrap();
    assert!(!response.access_token.is_empty());
}
