use serde::Deserialize;
use security_core::config as core_config;
use security_core::error::AppError;
use std::env;
use std::fmt;

use crate::claims::IdType;
use crate::error::SecurityError;

const MIN_SECRET_LEN: usize = 16;
/// One year.
pub const MAX_TOKEN_EXPIRY_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub security: SecuritySettings,
    pub bearer_scheme_registered: bool,
    pub enable_swagger: bool,
    pub default_users_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

/// Signing and provider settings shared read-only by every authenticator.
#[derive(Clone, Deserialize)]
pub struct SecuritySettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub id_type: IdType,
    pub token_expiry_in_hours: i64,
    pub azure_ad: Option<AzureADSecuritySettings>,
    pub facebook: Option<FacebookSecuritySettings>,
}

#[derive(Clone, Deserialize)]
pub struct AzureADSecuritySettings {
    pub instance: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub resource_id: String,
}

#[derive(Clone, Deserialize)]
pub struct FacebookSecuritySettings {
    pub app_id: String,
    pub app_secret: String,
    pub graph_url: String,
}

pub const DEFAULT_AZURE_AD_INSTANCE: &str = "https://login.microsoftonline.com/";
pub const DEFAULT_FACEBOOK_GRAPH_URL: &str = "https://graph.facebook.com";

impl SecuritySettings {
    pub fn new(
        secret: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            id_type: IdType::Name,
            token_expiry_in_hours: 1,
            azure_ad: None,
            facebook: None,
        }
    }

    pub fn validate(&self) -> Result<(), SecurityError> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(SecurityError::config(format!(
                "Signing secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if self.issuer.trim().is_empty() {
            return Err(SecurityError::config("Issuer must be set"));
        }
        if self.audience.trim().is_empty() {
            return Err(SecurityError::config("Audience must be set"));
        }
        if self.token_expiry_in_hours <= 0 {
            return Err(SecurityError::config("Token expiry must be positive"));
        }
        if self.token_expiry_in_hours > MAX_TOKEN_EXPIRY_HOURS {
            return Err(SecurityError::config(format!(
                "Token expiry must not exceed {} hours",
                MAX_TOKEN_EXPIRY_HOURS
            )));
        }
        Ok(())
    }

    pub fn token_expiry_seconds(&self) -> i64 {
        self.token_expiry_in_hours.saturating_mul(3600)
    }
}

impl AzureADSecuritySettings {
    pub fn validate(&self) -> Result<(), SecurityError> {
        require("Azure AD instance", &self.instance)?;
        require("Azure AD tenant id", &self.tenant_id)?;
        require("Azure AD client id", &self.client_id)?;
        require("Azure AD client secret", &self.client_secret)?;
        require("Azure AD resource id", &self.resource_id)
    }

    /// Token endpoint of the tenant.
    pub fn authority(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.instance.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

impl FacebookSecuritySettings {
    pub fn validate(&self) -> Result<(), SecurityError> {
        require("Facebook app id", &self.app_id)?;
        require("Facebook app secret", &self.app_secret)?;
        require("Facebook graph url", &self.graph_url)
    }
}

fn require(name: &str, value: &str) -> Result<(), SecurityError> {
    if value.trim().is_empty() {
        return Err(SecurityError::config(format!("{} is required", name)));
    }
    Ok(())
}

impl fmt::Debug for SecuritySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecuritySettings")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("id_type", &self.id_type)
            .field("token_expiry_in_hours", &self.token_expiry_in_hours)
            .field("azure_ad", &self.azure_ad)
            .field("facebook", &self.facebook)
            .finish()
    }
}

impl fmt::Debug for AzureADSecuritySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureADSecuritySettings")
            .field("instance", &self.instance)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("resource_id", &self.resource_id)
            .finish()
    }
}

impl fmt::Debug for FacebookSecuritySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacebookSecuritySettings")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("graph_url", &self.graph_url)
            .finish()
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let security = SecuritySettings {
            secret: get_env("JWT_SECRET", None, is_prod)?,
            issuer: get_env("JWT_ISSUER", Some("jwt-security"), is_prod)?,
            audience: get_env("JWT_AUDIENCE", Some("jwt-security-clients"), is_prod)?,
            id_type: get_env("JWT_ID_TYPE", Some("name"), is_prod)?
                .parse()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            token_expiry_in_hours: get_env("JWT_TOKEN_EXPIRY_HOURS", Some("1"), is_prod)?
                .parse()
                .map_err(|e: std::num::ParseIntError| {
                    AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                })?,
            azure_ad: match optional_env("AZURE_AD_TENANT_ID") {
                Some(tenant_id) => Some(AzureADSecuritySettings {
                    instance: optional_env("AZURE_AD_INSTANCE")
                        .unwrap_or_else(|| DEFAULT_AZURE_AD_INSTANCE.to_string()),
                    tenant_id,
                    client_id: get_env("AZURE_AD_CLIENT_ID", None, is_prod)?,
                    client_secret: get_env("AZURE_AD_CLIENT_SECRET", None, is_prod)?,
                    resource_id: get_env("AZURE_AD_RESOURCE_ID", None, is_prod)?,
                }),
                None => None,
            },
            facebook: match optional_env("FACEBOOK_APP_ID") {
                Some(app_id) => Some(FacebookSecuritySettings {
                    app_id,
                    app_secret: get_env("FACEBOOK_APP_SECRET", None, is_prod)?,
                    graph_url: optional_env("FACEBOOK_GRAPH_URL")
                        .unwrap_or_else(|| DEFAULT_FACEBOOK_GRAPH_URL.to_string()),
                }),
                None => None,
            },
        };

        let config = ServiceConfig {
            common: common_config,
            environment: environment.clone(),
            service_name: get_env("SERVICE_NAME", Some("jwt-security"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: optional_env("OTLP_ENDPOINT"),
            security,
            bearer_scheme_registered: parse_bool(
                &get_env("BEARER_SCHEME_REGISTERED", Some("false"), false)?,
            ),
            enable_swagger: parse_bool(&get_env("ENABLE_SWAGGER", Some("true"), false)?),
            default_users_file: optional_env("DEFAULT_USERS_FILE"),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        self.security.validate()?;

        if self.environment == Environment::Prod && self.enable_swagger {
            tracing::warn!("Swagger UI is enabled in production");
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SecuritySettings {
        SecuritySettings::new("0123456789abcdef0123", "issuer", "audience")
    }

    #[test]
    fn test_valid_settings() {
        assert!(settings().validate().is_ok());
        assert_eq!(settings().token_expiry_seconds(), 3600);
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut s = settings();
        s.secret = "short".to_string();
        assert!(matches!(s.validate(), Err(SecurityError::Configuration(_))));
    }

    #[test]
    fn test_non_positive_expiry_rejected() {
        let mut s = settings();
        s.token_expiry_in_hours = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_oversized_expiry_rejected() {
        let mut s = settings();
        s.token_expiry_in_hours = MAX_TOKEN_EXPIRY_HOURS;
        assert!(s.validate().is_ok());

        s.token_expiry_in_hours = 1_000_000_000_000;
        assert!(matches!(s.validate(), Err(SecurityError::Configuration(_))));

        s.token_expiry_in_hours = i64::MAX;
        assert!(s.validate().is_err());
        assert_eq!(s.token_expiry_seconds(), i64::MAX);
    }

    #[test]
    fn test_provider_settings_require_fields() {
        let facebook = FacebookSecuritySettings {
            app_id: "".to_string(),
            app_secret: "secret".to_string(),
            graph_url: DEFAULT_FACEBOOK_GRAPH_URL.to_string(),
        };
        assert!(facebook.validate().is_err());

        let azure = AzureADSecuritySettings {
            instance: DEFAULT_AZURE_AD_INSTANCE.to_string(),
            tenant_id: "tenant".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            resource_id: "api://resource".to_string(),
        };
        assert!(azure.validate().is_ok());
        assert_eq!(
            azure.authority(),
            "https://login.microsoftonline.com/tenant/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", settings());
        assert!(!rendered.contains("0123456789abcdef0123"));
    }

    #[test]
    fn test_parse_environment_and_bool() {
        assert_eq!("PROD".parse::<Environment>(), Ok(Environment::Prod));
        assert!("staging".parse::<Environment>().is_err());
        assert!(parse_bool("True"));
        assert!(!parse_bool("no"));
    }
}
