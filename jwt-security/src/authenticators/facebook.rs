use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

use super::{issue_for, AuthError, Authenticator};
use crate::builder::ProviderKind;
use crate::claims::ClaimBuilder;
use crate::clients::FacebookClient;
use crate::config::SecuritySettings;
use crate::error::SecurityError;
use crate::models::{AuthResponse, FacebookUser};
use crate::services::TokenIssuer;

/// Exchanges a Facebook user access token for a local token.
///
/// The token is checked with Graph API `debug_token`; it must be valid and
/// issued for the configured app. The verified Facebook user id is emitted
/// under the configured [`crate::claims::IdType`], followed by any caller rules.
pub struct FacebookAuthenticator {
    app_id: String,
    client: Arc<dyn FacebookClient>,
    claims: ClaimBuilder<FacebookUser>,
    issuer: Arc<dyn TokenIssuer>,
}

impl FacebookAuthenticator {
    pub fn new(
        settings: &SecuritySettings,
        client: Arc<dyn FacebookClient>,
        extra_claims: Option<ClaimBuilder<FacebookUser>>,
        issuer: Arc<dyn TokenIssuer>,
    ) -> Result<Self, SecurityError> {
        let facebook = settings
            .facebook
            .as_ref()
            .ok_or_else(|| SecurityError::config("Facebook settings are missing"))?;
        facebook.validate()?;

        let base = ClaimBuilder::new().try_add_claim_with(settings.id_type, |user: &FacebookUser| {
            user.user_id
                .clone()
                .ok_or_else(|| anyhow::anyhow!("Facebook user id missing"))
        });
        let claims = match extra_claims {
            Some(extra) => base.merge(extra),
            None => base,
        };

        Ok(Self {
            app_id: facebook.app_id.clone(),
            client,
            claims,
            issuer,
        })
    }
}

#[async_trait]
impl Authenticator<FacebookUser> for FacebookAuthenticator {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Facebook
    }

    async fn validate(&self, credential: Option<FacebookUser>) -> Result<AuthResponse, AuthError> {
        let mut user = credential.ok_or_else(|| AuthError::rejected("Missing credential"))?;
        user.validate()
            .map_err(|e| AuthError::rejected(e.to_string()))?;

        let info = self
            .client
            .debug_token(&user.user_access_token)
            .await
            .map_err(AuthError::Provider)?;

        if !info.is_valid {
            return Err(AuthError::rejected("Facebook token is not valid"));
        }
        if info.app_id.as_deref() != Some(self.app_id.as_str()) {
            return Err(AuthError::rejected("Facebook token was issued for another app"));
        }

        user.user_id = info.user_id;
        tracing::debug!(user_id = ?user.user_id, "Facebook token verified");

        issue_for(self.issuer.as_ref(), &self.claims, &user).await
    }
}
