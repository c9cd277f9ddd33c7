//! Shared fixtures for jwt-security integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use jwt_security::{
    authenticators::CredentialValidator,
    claims::Claim,
    clients::{AzureADClient, AzureADToken, FacebookClient, FacebookTokenInfo},
    config::{AzureADSecuritySettings, FacebookSecuritySettings, SecuritySettings},
    models::AuthenticationUser,
    services::{IssuedToken, TokenClaims, TokenIssuer},
};
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const TEST_SECRET: &str = "integration-secret-0123456789";
pub const TEST_ISSUER: &str = "jwt-security-test";
pub const TEST_AUDIENCE: &str = "jwt-security-test-clients";
pub const FACEBOOK_APP_ID: &str = "1234567890";

pub fn test_settings() -> SecuritySettings {
    let mut settings = SecuritySettings::new(TEST_SECRET, TEST_ISSUER, TEST_AUDIENCE);
    settings.azure_ad = Some(AzureADSecuritySettings {
        instance: "https://login.example.test/".to_string(),
        tenant_id: "tenant".to_string(),
        client_id: "client".to_string(),
        client_secret: "client-secret".to_string(),
        resource_id: "api://resource".to_string(),
    });
    settings.facebook = Some(FacebookSecuritySettings {
        app_id: FACEBOOK_APP_ID.to_string(),
        app_secret: "facebook-secret".to_string(),
        graph_url: "https://graph.example.test".to_string(),
    });
    settings
}

/// Settings without any external provider section.
pub fn bare_settings() -> SecuritySettings {
    SecuritySettings::new(TEST_SECRET, TEST_ISSUER, TEST_AUDIENCE)
}

/// Verifies a token issued with [`test_settings`].
pub fn decode(token: &str) -> TokenClaims {
    jwt_security::services::JwtService::new(&test_settings())
        .and_then(|jwt| jwt.validate_access_token(token))
        .expect("token should verify")
}

/// Identity claims of a decoded token as (claim, value) pairs in order.
pub fn identity_pairs(claims: &TokenClaims) -> Vec<(String, String)> {
    claims
        .identity
        .iter()
        .map(|(k, v)| (k.clone(), v.as_str().unwrap_or_default().to_string()))
        .collect()
}

/// Caller-defined user model.
#[derive(Debug, Clone, Deserialize)]
pub struct Employee {
    pub email: String,
    pub department: Option<String>,
}

impl AuthenticationUser for Employee {}

#[derive(Debug, Clone, Deserialize)]
pub struct Contractor {
    pub agency: String,
}

impl AuthenticationUser for Contractor {}

/// Accepts or refuses every credential.
pub struct StaticValidator(pub bool);

#[async_trait]
impl<U: AuthenticationUser> CredentialValidator<U> for StaticValidator {
    async fn is_valid(&self, _user: &U) -> Result<bool, anyhow::Error> {
        Ok(self.0)
    }
}

/// Simulates an unreachable user store.
pub struct FailingValidator;

#[async_trait]
impl<U: AuthenticationUser> CredentialValidator<U> for FailingValidator {
    async fn is_valid(&self, _user: &U) -> Result<bool, anyhow::Error> {
        Err(anyhow::anyhow!("user store unavailable"))
    }
}

pub struct FailingIssuer;

#[async_trait]
impl TokenIssuer for FailingIssuer {
    async fn issue_token(&self, _claims: &[Claim]) -> Result<IssuedToken, anyhow::Error> {
        Err(anyhow::anyhow!("signing key unavailable"))
    }
}

pub enum FacebookBehavior {
    Valid { app_id: String, user_id: String },
    Invalid,
    Outage,
}

pub struct MockFacebookClient {
    behavior: FacebookBehavior,
    pub calls: AtomicUsize,
}

impl MockFacebookClient {
    pub fn valid(user_id: &str) -> Self {
        Self::with(FacebookBehavior::Valid {
            app_id: FACEBOOK_APP_ID.to_string(),
            user_id: user_id.to_string(),
        })
    }

    pub fn for_other_app(user_id: &str) -> Self {
        Self::with(FacebookBehavior::Valid {
            app_id: "someone-elses-app".to_string(),
            user_id: user_id.to_string(),
        })
    }

    pub fn invalid() -> Self {
        Self::with(FacebookBehavior::Invalid)
    }

    pub fn outage() -> Self {
        Self::with(FacebookBehavior::Outage)
    }

    fn with(behavior: FacebookBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FacebookClient for MockFacebookClient {
    async fn debug_token(&self, _user_access_token: &str) -> Result<FacebookTokenInfo, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            FacebookBehavior::Valid { app_id, user_id } => Ok(FacebookTokenInfo {
                is_valid: true,
                app_id: Some(app_id.clone()),
                user_id: Some(user_id.clone()),
                expires_at: None,
                scopes: vec!["public_profile".to_string()],
            }),
            FacebookBehavior::Invalid => Ok(FacebookTokenInfo::default()),
            FacebookBehavior::Outage => Err(anyhow::anyhow!("graph api timed out")),
        }
    }
}

pub enum AzureBehavior {
    Grant(String),
    Refuse,
    Outage,
}

pub struct MockAzureADClient(pub AzureBehavior);

#[async_trait]
impl AzureADClient for MockAzureADClient {
    async fn acquire_token(&self) -> Result<Option<AzureADToken>, anyhow::Error> {
        match &self.0 {
            AzureBehavior::Grant(token) => Ok(Some(AzureADToken {
                access_token: token.clone(),
                token_type: Some("Bearer".to_string()),
                expires_in: Some(3599),
            })),
            AzureBehavior::Refuse => Ok(None),
            AzureBehavior::Outage => Err(anyhow::anyhow!("azure ad unreachable")),
        }
    }
}
