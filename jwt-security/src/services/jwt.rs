use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::claims::Claim;
use crate::config::SecuritySettings;

/// Signs a claim set into a bearer token.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue_token(&self, claims: &[Claim]) -> Result<IssuedToken, anyhow::Error>;
}

/// Checks a bearer token and returns its claims.
pub trait TokenVerifier: Send + Sync {
    fn verify_token(&self, token: &str) -> Result<TokenClaims, anyhow::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: i64,
}

/// Registered claims plus the identity claims, as found in a verified token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    #[serde(flatten)]
    pub identity: Map<String, Value>,
}

impl TokenClaims {
    /// First value of an identity claim.
    pub fn get(&self, claim_type: &str) -> Option<&str> {
        match self.identity.get(claim_type)? {
            Value::String(s) => Some(s),
            Value::Array(values) => values.first().and_then(Value::as_str),
            _ => None,
        }
    }
}

const REGISTERED_CLAIMS: [&str; 5] = ["iss", "aud", "exp", "iat", "jti"];

/// HS256 JWT issuer and verifier.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    token_expiry_seconds: i64,
}

impl JwtService {
    pub fn new(settings: &SecuritySettings) -> Result<Self, anyhow::Error> {
        if settings.secret.is_empty() {
            return Err(anyhow::anyhow!("Signing secret is empty"));
        }

        tracing::info!(issuer = %settings.issuer, "JWT service initialized with HS256 key");

        Ok(Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            token_expiry_seconds: settings.token_expiry_seconds(),
        })
    }

    /// Builds the token payload. Identity claims come first in declaration
    /// order; a claim type seen more than once becomes an array. Registered
    /// claims are written last and cannot be overridden.
    fn payload(&self, claims: &[Claim]) -> Result<Map<String, Value>, anyhow::Error> {
        let mut payload = Map::new();

        for claim in claims {
            if REGISTERED_CLAIMS.contains(&claim.claim_type.as_str()) {
                tracing::warn!(claim_type = %claim.claim_type, "Ignoring reserved claim");
                continue;
            }
            let value = Value::String(claim.value.clone());
            match payload.get_mut(&claim.claim_type) {
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    payload.insert(claim.claim_type.clone(), value);
                }
            }
        }

        let now = Utc::now();
        let exp = Duration::try_seconds(self.token_expiry_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Token lifetime of {}s is out of range",
                    self.token_expiry_seconds
                )
            })?;

        payload.insert("iss".to_string(), Value::from(self.issuer.clone()));
        payload.insert("aud".to_string(), Value::from(self.audience.clone()));
        payload.insert("exp".to_string(), Value::from(exp.timestamp()));
        payload.insert("iat".to_string(), Value::from(now.timestamp()));
        payload.insert("jti".to_string(), Value::from(Uuid::new_v4().to_string()));
        Ok(payload)
    }

    pub fn generate_access_token(&self, claims: &[Claim]) -> Result<String, anyhow::Error> {
        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &self.payload(claims)?, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))?;

        Ok(token)
    }

    /// Verifies signature, expiry, issuer and audience.
    pub fn validate_access_token(&self, token: &str) -> Result<TokenClaims, anyhow::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid access token: {}", e))?;

        Ok(token_data.claims)
    }

    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.token_expiry_seconds
    }
}

#[async_trait]
impl TokenIssuer for JwtService {
    async fn issue_token(&self, claims: &[Claim]) -> Result<IssuedToken, anyhow::Error> {
        let access_token = self.generate_access_token(claims)?;
        Ok(IssuedToken {
            access_token,
            expires_in: self.token_expiry_seconds,
        })
    }
}

impl TokenVerifier for JwtService {
    fn verify_token(&self, token: &str) -> Result<TokenClaims, anyhow::Error> {
        self.validate_access_token(token)
    }
}
