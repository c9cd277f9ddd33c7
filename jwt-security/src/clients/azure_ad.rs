use async_trait::async_trait;
use serde::Deserialize;

use crate::config::AzureADSecuritySettings;

/// Successful token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AzureADToken {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
}

#[async_trait]
pub trait AzureADClient: Send + Sync {
    /// `Ok(None)` when Azure AD refuses the application's credentials.
    async fn acquire_token(&self) -> Result<Option<AzureADToken>, anyhow::Error>;
}

/// Client credentials grant against the tenant's v2.0 token endpoint.
#[derive(Clone)]
pub struct ClientCredentialsClient {
    http: reqwest::Client,
    settings: AzureADSecuritySettings,
}

impl ClientCredentialsClient {
    pub fn new(settings: &AzureADSecuritySettings) -> Result<Self, anyhow::Error> {
        Ok(Self {
            http: super::http_client()?,
            settings: settings.clone(),
        })
    }

    fn scope(&self) -> String {
        format!("{}/.default", self.settings.resource_id.trim_end_matches('/'))
    }
}

#[async_trait]
impl AzureADClient for ClientCredentialsClient {
    async fn acquire_token(&self) -> Result<Option<AzureADToken>, anyhow::Error> {
        let scope = self.scope();
        let res = self
            .http
            .post(self.settings.authority())
            .form(&[
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("grant_type", "client_credentials"),
                ("scope", scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to reach Azure AD");
                anyhow::anyhow!("Azure AD unreachable: {}", e)
            })?;

        let status = res.status();
        if status.is_client_error() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Azure AD token request refused");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(anyhow::anyhow!("Azure AD returned {}", status));
        }

        let token: AzureADToken = res.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Azure AD token response");
            anyhow::anyhow!("Malformed Azure AD token response: {}", e)
        })?;

        Ok(Some(token))
    }
}
