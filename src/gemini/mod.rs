pub mod image_client;
pub mod text_client;

use crate::{
    config::{build_http_client, GeminiConfig},
    error::{GenAiError, Result},
    models::GoogleErrorResponse,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use image_client::ImageClient;
pub use text_client::TextClient;

/// Authenticated access to the Generative Language REST API, shared by the
/// text and image clients.
#[derive(Clone)]
pub struct GeminiTransport {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiTransport {
    fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.base_url.trim_end_matches('/'),
            model,
            method
        )
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        model: &str,
        method: &str,
        payload: &Value,
    ) -> Result<T> {
        let url = self.endpoint(model, method);
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| GenAiError::RequestError(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenAiError::ResponseError(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GoogleErrorResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), body));
            return Err(GenAiError::ResponseError(message));
        }

        serde_json::from_str(&body).map_err(|e| GenAiError::ResponseError(e.to_string()))
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    text_client: TextClient,
    image_client: ImageClient,
}

impl GeminiClient {
    /// Fails with `ConfigError` when no API key is configured.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GenAiError::ConfigError("API_KEY environment variable not set".into())
            })?;

        let transport = GeminiTransport {
            http: build_http_client(config.timeout),
            api_key,
            base_url: config.base_url,
        };

        log::info!(
            "Gemini client ready (text: {}, image: {})",
            config.text_model,
            config.image_model
        );

        Ok(Self {
            text_client: TextClient::new(transport.clone(), config.text_model),
            image_client: ImageClient::new(transport, config.image_model),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env())
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}
