//! Token issuance and credential checking.

mod credentials;
mod jwt;

pub use credentials::{CredentialRecord, InMemoryCredentialStore};
pub use jwt::{IssuedToken, JwtService, TokenClaims, TokenIssuer, TokenVerifier};
