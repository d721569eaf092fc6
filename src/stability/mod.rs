pub mod image_client;

use crate::config::{build_http_client, StabilityConfig};

pub use image_client::StabilityImageClient;

#[derive(Clone)]
pub struct StabilityClient {
    image_client: StabilityImageClient,
}

impl StabilityClient {
    /// Never fails: a missing key is reported by every generation call instead.
    pub fn new(config: StabilityConfig) -> Self {
        let api_key = config.api_key.filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            log::warn!("STABILITY_API_KEY is not set; Stability AI requests will be rejected");
        }

        Self {
            image_client: StabilityImageClient::new(
                build_http_client(config.timeout),
                api_key,
                config.base_url,
                config.engine,
            ),
        }
    }

    pub fn from_env() -> Self {
        Self::new(StabilityConfig::from_env())
    }

    pub fn image(&self) -> &StabilityImageClient {
        &self.image_client
    }

    pub fn is_configured(&self) -> bool {
        self.image_client.is_configured()
    }
}
