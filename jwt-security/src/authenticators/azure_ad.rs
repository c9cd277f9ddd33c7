use async_trait::async_trait;
use std::sync::Arc;

use super::{AuthError, Authenticator};
use crate::builder::ProviderKind;
use crate::clients::AzureADClient;
use crate::models::{AzureADResponse, AzureADUser};

/// Obtains an Azure AD token through the client credentials grant. The
/// credential is ignored; the configured application is the identity.
pub struct AzureADAuthenticator {
    client: Arc<dyn AzureADClient>,
}

impl AzureADAuthenticator {
    pub fn new(client: Arc<dyn AzureADClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Authenticator<AzureADUser, AzureADResponse> for AzureADAuthenticator {
    fn kind(&self) -> ProviderKind {
        ProviderKind::AzureAD
    }

    async fn validate(&self, _credential: Option<AzureADUser>) -> Result<AzureADResponse, AuthError> {
        let token = self
            .client
            .acquire_token()
            .await
            .map_err(AuthError::Provider)?;

        match token {
            Some(token) if !token.access_token.is_empty() => Ok(AzureADResponse {
                access_token: token.access_token,
                is_authenticated: true,
                expires_in: token.expires_in,
            }),
            _ => Err(AuthError::rejected("Azure AD refused the client credentials")),
        }
    }
}
