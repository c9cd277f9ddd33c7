//! Authenticator contract and one implementation per provider kind.
//!
//! Every provider implements [`Authenticator::validate`], which reports a
//! refused credential as a validation failure and an unreachable provider or
//! broken signer as an infrastructure fault. Callers at the HTTP boundary use
//! [`Authenticator::is_valid_user`] instead: it turns validation failures into
//! an empty-token response and only returns `Err` for infrastructure faults.

mod azure_ad;
mod custom;
mod default;
mod facebook;

pub use azure_ad::AzureADAuthenticator;
pub use custom::CustomAuthenticator;
pub use default::DefaultAuthenticator;
pub use facebook::FacebookAuthenticator;

use async_trait::async_trait;
use security_core::error::AppError;
use thiserror::Error;

use crate::builder::ProviderKind;
use crate::claims::{ClaimBuilder, ClaimError};
use crate::models::{AuthResponse, AuthenticationUser, TokenResponse};
use crate::services::TokenIssuer;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credential rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    ClaimDerivation(#[from] ClaimError),

    #[error("Identity provider error: {0}")]
    Provider(anyhow::Error),

    #[error("Token issuance failed: {0}")]
    Issuer(anyhow::Error),
}

impl AuthError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        AuthError::Rejected(reason.into())
    }

    /// Expected outcome of a bad credential, as opposed to a fault.
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, AuthError::Rejected(_) | AuthError::ClaimDerivation(_))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Rejected(reason) => AppError::BadRequest(anyhow::anyhow!(reason)),
            AuthError::ClaimDerivation(e) => AppError::BadRequest(anyhow::Error::new(e)),
            AuthError::Provider(e) => AppError::BadGateway(e.to_string()),
            AuthError::Issuer(e) => AppError::InternalError(e),
        }
    }
}

/// Caller-supplied credential check, e.g. a lookup in a user store.
#[async_trait]
pub trait CredentialValidator<U: AuthenticationUser>: Send + Sync {
    async fn is_valid(&self, user: &U) -> Result<bool, anyhow::Error>;
}

#[async_trait]
impl<U, V> CredentialValidator<U> for std::sync::Arc<V>
where
    U: AuthenticationUser,
    V: CredentialValidator<U> + ?Sized,
{
    async fn is_valid(&self, user: &U) -> Result<bool, anyhow::Error> {
        (**self).is_valid(user).await
    }
}

#[async_trait]
pub trait Authenticator<U, R = AuthResponse>: Send + Sync
where
    U: AuthenticationUser,
    R: TokenResponse,
{
    fn kind(&self) -> ProviderKind;

    /// Validates the credential. `None` means the provider exchanges
    /// credentials out of band.
    async fn validate(&self, credential: Option<U>) -> Result<R, AuthError>;

    async fn is_valid_user(&self, credential: Option<U>) -> Result<R, AuthError> {
        match self.validate(credential).await {
            Ok(response) if response.is_authenticated() => {
                tracing::info!(provider = %self.kind(), "Authentication succeeded");
                Ok(response)
            }
            Ok(_) => {
                tracing::info!(provider = %self.kind(), "Authentication returned no token");
                Ok(R::rejected())
            }
            Err(e) if e.is_validation_failure() => {
                tracing::info!(provider = %self.kind(), reason = %e, "Authentication rejected");
                Ok(R::rejected())
            }
            Err(e) => {
                tracing::error!(provider = %self.kind(), error = %e, "Authentication failed");
                Err(e)
            }
        }
    }
}

/// Materializes the user's claims and signs them.
pub(crate) async fn issue_for<U>(
    issuer: &dyn TokenIssuer,
    claims: &ClaimBuilder<U>,
    user: &U,
) -> Result<AuthResponse, AuthError> {
    let claims = claims.to_claims(user)?;
    let issued = issuer
        .issue_token(&claims)
        .await
        .map_err(AuthError::Issuer)?;

    Ok(AuthResponse::bearer(issued.access_token, issued.expires_in))
}
