//! Claim vocabulary and per-user-model claim rules.

mod builder;
mod id_type;

pub use builder::{Claim, ClaimBuilder, ClaimError, ClaimKey};
pub use id_type::{load_claim_types, ClaimTypes, IdType};
