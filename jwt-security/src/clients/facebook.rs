use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::config::FacebookSecuritySettings;

/// `data` object of a Graph API `debug_token` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FacebookTokenInfo {
    #[serde(default)]
    pub is_valid: bool,
    pub app_id: Option<String>,
    pub user_id: Option<String>,
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DebugTokenEnvelope {
    data: FacebookTokenInfo,
}

#[async_trait]
pub trait FacebookClient: Send + Sync {
    /// Inspects a user access token. A token Facebook refuses to describe is
    /// reported as invalid; only transport and server failures are errors.
    async fn debug_token(&self, user_access_token: &str) -> Result<FacebookTokenInfo, anyhow::Error>;
}

/// Graph API client authenticated with the app access token.
#[derive(Clone)]
pub struct GraphFacebookClient {
    http: reqwest::Client,
    settings: FacebookSecuritySettings,
}

impl GraphFacebookClient {
    pub fn new(settings: &FacebookSecuritySettings) -> Result<Self, anyhow::Error> {
        Ok(Self {
            http: super::http_client()?,
            settings: settings.clone(),
        })
    }

    fn app_access_token(&self) -> String {
        format!("{}|{}", self.settings.app_id, self.settings.app_secret)
    }
}

/// Hex HMAC-SHA256 of the access token keyed with the app secret.
pub fn appsecret_proof(app_secret: &str, access_token: &str) -> Result<String, anyhow::Error> {
    let mut mac = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid app secret: {}", e))?;
    mac.update(access_token.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl FacebookClient for GraphFacebookClient {
    async fn debug_token(&self, user_access_token: &str) -> Result<FacebookTokenInfo, anyhow::Error> {
        let app_token = self.app_access_token();
        let proof = appsecret_proof(&self.settings.app_secret, &app_token)?;
        let url = format!("{}/debug_token", self.settings.graph_url.trim_end_matches('/'));

        let res = self
            .http
            .get(&url)
            .query(&[
                ("input_token", user_access_token),
                ("access_token", app_token.as_str()),
                ("appsecret_proof", proof.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to reach Facebook Graph API");
                anyhow::anyhow!("Facebook Graph API unreachable: {}", e)
            })?;

        let status = res.status();
        if status.is_client_error() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Facebook refused to inspect token");
            return Ok(FacebookTokenInfo::default());
        }
        if !status.is_success() {
            return Err(anyhow::anyhow!("Facebook Graph API returned {}", status));
        }

        let envelope: DebugTokenEnvelope = res.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Facebook debug_token response");
            anyhow::anyhow!("Malformed debug_token response: {}", e)
        })?;

        Ok(envelope.data)
    }
}
