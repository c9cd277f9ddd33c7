use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Shape shared by every authenticator result. An empty access token means
/// the credential was not accepted.
pub trait TokenResponse: Send + Sync + 'static {
    /// The response returned for a rejected credential.
    fn rejected() -> Self;

    fn access_token(&self) -> &str;

    fn is_authenticated(&self) -> bool {
        !self.access_token().is_empty()
    }
}

/// Token returned by the default, custom and Facebook providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiJ9...")]
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 3600)]
    pub expires_in: Option<i64>,
}

impl AuthResponse {
    pub fn bearer(access_token: impl Into<String>, expires_in: i64) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            expires_in: Some(expires_in),
        }
    }
}

impl TokenResponse for AuthResponse {
    fn rejected() -> Self {
        Self {
            access_token: String::new(),
            token_type: "Bearer".to_string(),
            expires_in: None,
        }
    }

    fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// Token obtained from Azure AD through the client credentials exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AzureADResponse {
    pub access_token: String,
    pub is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

impl TokenResponse for AzureADResponse {
    fn rejected() -> Self {
        Self {
            access_token: String::new(),
            is_authenticated: false,
            expires_in: None,
        }
    }

    fn access_token(&self) -> &str {
        &self.access_token
    }

    fn is_authenticated(&self) -> bool {
        self.is_authenticated && !self.access_token.is_empty()
    }
}
