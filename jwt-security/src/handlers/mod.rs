//! Token endpoints, one per provider kind, and the bearer-protected `/me`.

mod me;
mod token;

pub use me::*;
pub use token::*;
