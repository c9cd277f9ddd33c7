use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

/// Marker for types an authenticator can accept as a credential.
pub trait AuthenticationUser: Send + Sync + 'static {}

/// Credential of the default provider.
#[derive(Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct DefaultUser {
    #[validate(length(min = 1, message = "Id is required"))]
    #[schema(example = "alice")]
    pub id: String,

    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

impl DefaultUser {
    pub fn new(id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for DefaultUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultUser")
            .field("id", &self.id)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AuthenticationUser for DefaultUser {}

/// Facebook user access token, enriched with the Facebook user id once the
/// token has been verified.
#[derive(Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct FacebookUser {
    #[validate(length(min = 1, message = "User access token is required"))]
    #[schema(example = "EAAB...")]
    pub user_access_token: String,

    #[serde(default, skip_deserializing)]
    #[schema(read_only)]
    pub user_id: Option<String>,
}

impl FacebookUser {
    pub fn new(user_access_token: impl Into<String>) -> Self {
        Self {
            user_access_token: user_access_token.into(),
            user_id: None,
        }
    }
}

impl fmt::Debug for FacebookUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacebookUser")
            .field("user_access_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl AuthenticationUser for FacebookUser {}

/// Azure AD authenticates out of band, so the credential carries nothing.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct AzureADUser {}

impl AuthenticationUser for AzureADUser {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let user = DefaultUser::new("alice", "hunter2");
        let rendered = format!("{:?}", user);
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));

        let fb = FacebookUser::new("EAAB-token");
        assert!(!format!("{:?}", fb).contains("EAAB-token"));
    }

    #[test]
    fn test_facebook_user_id_not_accepted_from_clients() {
        let fb: FacebookUser =
            serde_json::from_str(r#"{"user_access_token":"t","user_id":"spoofed"}"#).unwrap();
        assert_eq!(fb.user_id, None);
    }

    #[test]
    fn test_default_user_validation() {
        assert!(DefaultUser::new("", "pw").validate().is_err());
        assert!(DefaultUser::new("alice", "pw").validate().is_ok());
    }
}
