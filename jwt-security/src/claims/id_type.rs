//! Canonical claim vocabulary.
//!
//! [`IdType`] names the identity claims the core knows about. The mapping to
//! JWT claim names lives in a process-wide [`ClaimTypes`] registry that is
//! built the first time [`load_claim_types`] runs and reused afterwards.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Identity claim kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    Actor,
    Country,
    DateOfBirth,
    Email,
    Gender,
    GivenName,
    HomePhone,
    Locality,
    MobilePhone,
    Name,
    PostalCode,
    Role,
    Sid,
    Subject,
    Surname,
    Webpage,
}

impl IdType {
    pub const ALL: [IdType; 16] = [
        IdType::Actor,
        IdType::Country,
        IdType::DateOfBirth,
        IdType::Email,
        IdType::Gender,
        IdType::GivenName,
        IdType::HomePhone,
        IdType::Locality,
        IdType::MobilePhone,
        IdType::Name,
        IdType::PostalCode,
        IdType::Role,
        IdType::Sid,
        IdType::Subject,
        IdType::Surname,
        IdType::Webpage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdType::Actor => "actor",
            IdType::Country => "country",
            IdType::DateOfBirth => "date_of_birth",
            IdType::Email => "email",
            IdType::Gender => "gender",
            IdType::GivenName => "given_name",
            IdType::HomePhone => "home_phone",
            IdType::Locality => "locality",
            IdType::MobilePhone => "mobile_phone",
            IdType::Name => "name",
            IdType::PostalCode => "postal_code",
            IdType::Role => "role",
            IdType::Sid => "sid",
            IdType::Subject => "subject",
            IdType::Surname => "surname",
            IdType::Webpage => "webpage",
        }
    }

    /// JWT claim name this kind is emitted under.
    pub fn claim_type(&self) -> &'static str {
        load_claim_types().claim_type(*self)
    }
}

impl std::fmt::Display for IdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        IdType::ALL
            .iter()
            .copied()
            .find(|id_type| id_type.as_str() == wanted)
            .ok_or_else(|| format!("Invalid id type: {}", s))
    }
}

/// Immutable IdType → claim name table.
#[derive(Debug)]
pub struct ClaimTypes {
    entries: Vec<(IdType, &'static str)>,
    by_claim: HashMap<&'static str, IdType>,
}

impl ClaimTypes {
    fn build() -> Self {
        let entries: Vec<(IdType, &'static str)> = IdType::ALL
            .iter()
            .map(|id_type| {
                let claim = match id_type {
                    IdType::Actor => "act",
                    IdType::Country => "country",
                    IdType::DateOfBirth => "birthdate",
                    IdType::Email => "email",
                    IdType::Gender => "gender",
                    IdType::GivenName => "given_name",
                    IdType::HomePhone => "home_phone",
                    IdType::Locality => "locality",
                    IdType::MobilePhone => "phone_number",
                    IdType::Name => "name",
                    IdType::PostalCode => "postal_code",
                    IdType::Role => "role",
                    IdType::Sid => "sid",
                    IdType::Subject => "sub",
                    IdType::Surname => "family_name",
                    IdType::Webpage => "website",
                };
                (*id_type, claim)
            })
            .collect();

        let by_claim = entries.iter().map(|(id, claim)| (*claim, *id)).collect();

        tracing::debug!(count = entries.len(), "Claim type vocabulary loaded");

        Self { entries, by_claim }
    }

    pub fn claim_type(&self, id_type: IdType) -> &'static str {
        self.entries
            .iter()
            .find(|(id, _)| *id == id_type)
            .map(|(_, claim)| *claim)
            // every variant is inserted by build()
            .unwrap_or_else(|| id_type.as_str())
    }

    pub fn id_type(&self, claim_type: &str) -> Option<IdType> {
        self.by_claim.get(claim_type).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IdType, &'static str)> + '_ {
        self.entries.iter().copied()
    }
}

static CLAIM_TYPES: OnceCell<ClaimTypes> = OnceCell::new();

/// Loads the claim vocabulary. Only the first call builds it.
pub fn load_claim_types() -> &'static ClaimTypes {
    CLAIM_TYPES.get_or_init(ClaimTypes::build)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_load_is_idempotent() {
        let first = load_claim_types();
        let second = load_claim_types();

        assert!(std::ptr::eq(first, second));
        assert_eq!(first.len(), IdType::ALL.len());
        assert_eq!(
            first.iter().collect::<Vec<_>>(),
            second.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_no_duplicate_claim_names() {
        let names: HashSet<_> = load_claim_types().iter().map(|(_, c)| c).collect();
        assert_eq!(names.len(), IdType::ALL.len());
    }

    #[test]
    fn test_reverse_lookup() {
        let types = load_claim_types();
        assert_eq!(types.id_type("sub"), Some(IdType::Subject));
        assert_eq!(types.id_type("family_name"), Some(IdType::Surname));
        assert_eq!(types.id_type("unknown"), None);
        assert_eq!(IdType::Email.claim_type(), "email");
    }

    #[test]
    fn test_parse_id_type() {
        assert_eq!("Name".parse::<IdType>(), Ok(IdType::Name));
        assert_eq!(" date_of_birth ".parse::<IdType>(), Ok(IdType::DateOfBirth));
        assert!("nickname".parse::<IdType>().is_err());
    }
}
