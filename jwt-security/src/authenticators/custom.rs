use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{issue_for, AuthError, Authenticator, CredentialValidator};
use crate::builder::ProviderKind;
use crate::claims::ClaimBuilder;
use crate::models::{AuthResponse, AuthenticationUser};
use crate::services::TokenIssuer;

/// Provider for a caller-defined user model. The token carries exactly the
/// claims declared on the model's [`ClaimBuilder`].
pub struct CustomAuthenticator<V, U> {
    validator: V,
    claims: ClaimBuilder<U>,
    issuer: Arc<dyn TokenIssuer>,
    _user: PhantomData<fn() -> U>,
}

impl<V, U> CustomAuthenticator<V, U>
where
    U: AuthenticationUser,
    V: CredentialValidator<U>,
{
    pub fn new(validator: V, claims: ClaimBuilder<U>, issuer: Arc<dyn TokenIssuer>) -> Self {
        Self {
            validator,
            claims,
            issuer,
            _user: PhantomData,
        }
    }
}

#[async_trait]
impl<V, U> Authenticator<U> for CustomAuthenticator<V, U>
where
    U: AuthenticationUser,
    V: CredentialValidator<U> + 'static,
{
    fn kind(&self) -> ProviderKind {
        ProviderKind::Custom
    }

    async fn validate(&self, credential: Option<U>) -> Result<AuthResponse, AuthError> {
        let user = credential.ok_or_else(|| AuthError::rejected("Missing credential"))?;

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
