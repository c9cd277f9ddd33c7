use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use utoipa::ToSchema;

use super::IdType;

/// Key a claim is emitted under: a vocabulary entry or a raw claim name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimKey {
    IdType(IdType),
    Raw(String),
}

impl ClaimKey {
    pub fn claim_type(&self) -> &str {
        match self {
            ClaimKey::IdType(id_type) => id_type.claim_type(),
            ClaimKey::Raw(name) => name,
        }
    }
}

impl From<IdType> for ClaimKey {
    fn from(id_type: IdType) -> Self {
        ClaimKey::IdType(id_type)
    }
}

impl From<&str> for ClaimKey {
    fn from(name: &str) -> Self {
        ClaimKey::Raw(name.to_string())
    }
}

impl From<String> for ClaimKey {
    fn from(name: String) -> Self {
        ClaimKey::Raw(name)
    }
}

/// A materialized identity claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Failed to derive claim '{claim_type}': {source}")]
    Derivation {
        claim_type: String,
        #[source]
        source: anyhow::Error,
    },
}

type DeriveFn<T> = Arc<dyn Fn(&T) -> Result<String, anyhow::Error> + Send + Sync>;

enum ClaimValue<T> {
    Static(String),
    Derived(DeriveFn<T>),
}

impl<T> Clone for ClaimValue<T> {
    fn clone(&self) -> Self {
        match self {
            ClaimValue::Static(value) => ClaimValue::Static(value.clone()),
            ClaimValue::Derived(derive) => ClaimValue::Derived(Arc::clone(derive)),
        }
    }
}

struct ClaimRule<T> {
    key: ClaimKey,
    value: ClaimValue<T>,
}

impl<T> Clone for ClaimRule<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

/// Ordered claim rules for one user model type.
///
/// Rules are declared once at startup and materialized per request with
/// [`ClaimBuilder::to_claims`]. Static rules always produce the same value;
/// derived rules read the authenticated user.
///
/// ```
/// use jwt_security::claims::{ClaimBuilder, IdType};
///
/// struct Account { id: String }
///
/// let claims = ClaimBuilder::<Account>::new()
///     .add_claim("role", "admin")
///     .add_claim_with(IdType::Subject, |a: &Account| a.id.clone())
///     .to_claims(&Account { id: "42".to_string() })
///     .unwrap();
///
/// assert_eq!(claims[1].claim_type, "sub");
/// ```
pub struct ClaimBuilder<T> {
    rules: Vec<ClaimRule<T>>,
}

impl<T> Default for ClaimBuilder<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> Clone for ClaimBuilder<T> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<T> fmt::Debug for ClaimBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimBuilder")
            .field("keys", &self.keys())
            .finish()
    }
}

impl<T> ClaimBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constant-valued claim.
    pub fn add_claim(mut self, key: impl Into<ClaimKey>, value: impl Into<String>) -> Self {
        self.rules.push(ClaimRule {
            key: key.into(),
            value: ClaimValue::Static(value.into()),
        });
        self
    }

    /// Adds a claim computed from the authenticated user.
    pub fn add_claim_with<F>(self, key: impl Into<ClaimKey>, derive: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.try_add_claim_with(key, move |user: &T| Ok(derive(user)))
    }

    /// Adds a derived claim whose computation may fail. A failure aborts
    /// [`ClaimBuilder::to_claims`] as a whole.
    pub fn try_add_claim_with<F>(mut self, key: impl Into<ClaimKey>, derive: F) -> Self
    where
        F: Fn(&T) -> Result<String, anyhow::Error> + Send + Sync + 'static,
    {
        self.rules.push(ClaimRule {
            key: key.into(),
            value: ClaimValue::Derived(Arc::new(derive)),
        });
        self
    }

    /// Appends `other`'s rules after this builder's rules.
    pub fn merge(mut self, other: ClaimBuilder<T>) -> Self {
        self.rules.extend(other.rules);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Claim names in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.rules
            .iter()
            .map(|rule| rule.key.claim_type().to_string())
            .collect()
    }

    pub fn to_claims(&self, user: &T) -> Result<Vec<Claim>, ClaimError> {
        let claims = self
            .rules
            .iter()
            .map(|rule| -> Result<Claim, ClaimError> {
                let claim_type = rule.key.claim_type();
                let value = match &rule.value {
                    ClaimValue::Static(value) => value.clone(),
                    ClaimValue::Derived(derive) => {
                        derive(user).map_err(|source| ClaimError::Derivation {
                            claim_type: claim_type.to_string(),
                            source,
                        })?
                    }
                };
                Ok(Claim::new(claim_type, value))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = claims.len(), "Claims materialized");
        Ok(claims)
    }
}
