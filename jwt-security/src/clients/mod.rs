//! Outbound calls to the external identity providers.

mod azure_ad;
mod facebook;

pub use azure_ad::{AzureADClient, AzureADToken, ClientCredentialsClient};
pub use facebook::{appsecret_proof, FacebookClient, FacebookTokenInfo, GraphFacebookClient};

use std::time::Duration;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

fn http_client() -> Result<reqwest::Client, anyhow::Error> {
    reqwest::Client::builder()
        .timeout(PROVIDER_TIMEOUT)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))
}
