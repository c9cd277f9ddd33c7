use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::authenticators::CredentialValidator;
use crate::models::DefaultUser;
use crate::utils::{hash_password, verify_password};

/// One entry of a users file.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialRecord {
    pub id: String,
    pub password_hash: String,
}

/// Argon2-backed id/password store for the default provider.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    users: HashMap<String, String>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a JSON array of `{ "id", "password_hash" }` records.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read users file {}: {}", path.display(), e))?;
        let records: Vec<CredentialRecord> = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse users file {}: {}", path.display(), e))?;

        let store = Self::from_records(records);
        tracing::info!(users = store.len(), path = %path.display(), "Credential store loaded");
        Ok(store)
    }

    pub fn from_records(records: impl IntoIterator<Item = CredentialRecord>) -> Self {
        let users = records
            .into_iter()
            .map(|record| (record.id, record.password_hash))
            .collect();
        Self { users }
    }

    /// Hashes `password` and stores it under `id`, replacing any previous entry.
    pub fn insert(&mut self, id: impl Into<String>, password: &str) -> Result<(), anyhow::Error> {
        let hash = hash_password(password)?;
        self.users.insert(id.into(), hash);
        Ok(())
    }

    pub fn with_user(mut self, id: impl Into<String>, password: &str) -> Result<Self, anyhow::Error> {
        self.insert(id, password)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialValidator<DefaultUser> for InMemoryCredentialStore {
    async fn is_valid(&self, user: &DefaultUser) -> Result<bool, anyhow::Error> {
        match self.users.get(&user.id) {
            Some(hash) => verify_password(&user.password, hash),
            None => {
                tracing::debug!(user_id = %user.id, "Unknown user");
                Ok(false)
            }
        }
    }
}
