use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

use super::{issue_for, AuthError, Authenticator, CredentialValidator};
use crate::builder::ProviderKind;
use crate::claims::ClaimBuilder;
use crate::config::SecuritySettings;
use crate::models::{AuthResponse, DefaultUser};
use crate::services::TokenIssuer;

/// Id/password provider. The token carries a single claim: the user id,
/// emitted under the configured [`crate::claims::IdType`].
pub struct DefaultAuthenticator<V> {
    validator: V,
    claims: ClaimBuilder<DefaultUser>,
    issuer: Arc<dyn TokenIssuer>,
}

impl<V> DefaultAuthenticator<V>
where
    V: CredentialValidator<DefaultUser>,
{
    pub fn new(validator: V, settings: &SecuritySettings, issuer: Arc<dyn TokenIssuer>) -> Self {
        let claims = ClaimBuilder::new().add_claim_with(settings.id_type, |user: &DefaultUser| {
            user.id.clone()
        });

        Self {
            validator,
            claims,
            issuer,
        }
    }
}

#[async_trait]
impl<V> Authenticator<DefaultUser> for DefaultAuthenticator<V>
where
    V: CredentialValidator<DefaultUser> + 'static,
{
    fn kind(&self) -> ProviderKind {
        ProviderKind::Default
    }

    async fn validate(&self, credential: Option<DefaultUser>) -> Result<AuthResponse, AuthError> {
        let user = credential.ok_or_else(|| AuthError::rejected("Missing credential"))?;
        user.validate()
            .map_err(|e| AuthError::rejected(e.to_string()))?;

        let valid = self
            .validator
            .is_valid(&user)
            .await
            .map_err(AuthError::Provider)?;
        if !valid {
            return Err(AuthError::rejected("Invalid credentials"));
        }

        issue_for(self.issuer.as_ref(), &self.claims, &user).await
    }
}
