use crate::{
    error::{GenAiError, Result},
    generator::ImageGenerator,
    logger::timer,
    models::{
        align_batch, common::non_blank, failed_batch, ImageProvider, ImageRequest,
        ImageResultBatch, StabilityErrorResponse, StabilityImagesResponse,
    },
};
use async_trait::async_trait;
use reqwest::{header::ACCEPT, multipart::Form, Client};

pub const NOT_CONFIGURED_ERROR: &str = "Stability AI API key is not configured.";
pub const NO_IMAGES_ERROR: &str = "Stability AI did not return any images.";

/// Multipart fields for the stable-image generate endpoint, in send order.
pub fn form_fields(request: &ImageRequest) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("prompt", request.prompt.clone()),
        ("aspect_ratio", request.aspect_ratio.as_str().to_string()),
        ("output_format", "jpeg".to_string()),
    ];
    if request.count > 1 {
        fields.push(("samples", request.count.to_string()));
    }
    if let Some(negative) = non_blank(request.negative_prompt.as_deref()) {
        fields.push(("negative_prompt", negative.to_string()));
    }
    fields
}

#[derive(Clone)]
pub struct StabilityImageClient {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    engine: String,
}

impl StabilityImageClient {
    pub fn new(http: Client, api_key: Option<String>, base_url: String, engine: String) -> Self {
        Self {
            http,
            api_key,
            base_url,
            engine,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v2beta/stable-image/generate/{}",
            self.base_url.trim_end_matches('/'),
            self.engine
        )
    }

    async fn request_images(&self, api_key: &str, request: &ImageRequest) -> Result<Vec<String>> {
        let form = form_fields(request)
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| GenAiError::RequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StabilityErrorResponse>(&body)
                .ok()
                .and_then(|r| r.errors.into_iter().next())
                .unwrap_or_else(|| format!("Unknown Stability AI error ({})", status.as_u16()));
            log::error!("Stability AI Error: {}", message);
            return Err(GenAiError::ResponseError(message));
        }

        let body: StabilityImagesResponse = response
            .json()
            .await
            .map_err(|e| GenAiError::ResponseError(e.to_string()))?;

        Ok(body.images.into_iter().map(|image| image.base64).collect())
    }
}

#[async_trait]
impl ImageGenerator for StabilityImageClient {
    fn provider(&self) -> ImageProvider {
        ImageProvider::Stability
    }

    async fn generate(&self, request: &ImageRequest) -> ImageResultBatch {
        if request.count == 0 {
            return Vec::new();
        }
        let Some(api_key) = self.api_key.as_deref() else {
            return failed_batch(NOT_CONFIGURED_ERROR, request.count);
        };

        let _timer = timer("stability generation");
        log::info!(
            "Generating {} image(s) with Stability engine: {}",
            request.count,
            self.engine
        );

        match self.request_images(api_key, request).await {
            Ok(images) => align_batch(images, request.count, NO_IMAGES_ERROR),
            Err(e) => {
                log::error!("Stability AI request failed: {}", e);
                failed_batch(
                    &format!("Stability AI Error: {}", e.detail()),
                    request.count,
                )
            }
        }
    }
}
