//! User and response models exchanged with the authenticators.

mod response;
mod user;

pub use response::{AuthResponse, AzureADResponse, TokenResponse};
pub use user::{AuthenticationUser, AzureADUser, DefaultUser, FacebookUser};
