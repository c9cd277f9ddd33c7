use security_core::error::AppError;
use thiserror::Error;

/// Startup-time failures raised while creating the builder or registering
/// providers.
#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Token issuer error: {0}")]
    Issuer(#[from] anyhow::Error),
}

impl SecurityError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SecurityError::Configuration(message.into())
    }
}

impl From<SecurityError> for AppError {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::Configuration(msg) => AppError::ConfigError(anyhow::anyhow!(msg)),
            SecurityError::Issuer(e) => AppError::ConfigError(e),
        }
    }
}
