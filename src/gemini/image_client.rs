use crate::{
    error::Result,
    gemini::GeminiTransport,
    generator::ImageGenerator,
    logger::timer,
    models::{
        align_batch, common::non_blank, failed_batch, ImageProvider, ImageRequest,
        ImageResultBatch, ImagenPredictResponse,
    },
    safety::{default_classifier, SafetyClassifier},
};
use async_trait::async_trait;
use serde_json::{json, Value};

pub const NO_IMAGE_ERROR: &str = "The API did not return an image.";
pub const SAFETY_BLOCKED_ERROR: &str =
    "This prompt was blocked for safety reasons. Please try rephrasing it.";
pub const GENERATION_FAILED_ERROR: &str = "Image generation failed.";

/// Imagen `:predict` request body. `negativePrompt` is left out entirely
/// when blank.
pub fn build_predict_payload(request: &ImageRequest) -> Value {
    let mut parameters = json!({
        "sampleCount": request.count,
        "aspectRatio": request.aspect_ratio.as_str(),
        "outputOptions": { "mimeType": "image/jpeg" }
    });
    if let Some(negative) = non_blank(request.negative_prompt.as_deref()) {
        parameters["negativePrompt"] = json!(negative);
    }

    json!({
        "instances": [{ "prompt": request.prompt }],
        "parameters": parameters
    })
}

#[derive(Clone)]
pub struct ImageClient {
    transport: GeminiTransport,
    model: String,
    classifier: SafetyClassifier,
}

impl ImageClient {
    pub fn new(transport: GeminiTransport, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
            classifier: default_classifier(),
        }
    }

    /// Replaces the safety-block detector used on failed requests.
    pub fn with_safety_classifier(mut self, classifier: SafetyClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request_images(&self, request: &ImageRequest) -> Result<Vec<String>> {
        let payload = build_predict_payload(request);
        let response: ImagenPredictResponse = self
            .transport
            .post_json(&self.model, "predict", &payload)
            .await?;

        let filtered = response
            .predictions
            .iter()
            .filter(|p| p.bytes_base64_encoded.is_none())
            .count();
        if filtered > 0 {
            log::warn!("{} Imagen prediction(s) came back without image data", filtered);
        }

        Ok(response
            .predictions
            .into_iter()
            .filter_map(|p| p.bytes_base64_encoded)
            .collect())
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    fn provider(&self) -> ImageProvider {
        ImageProvider::Imagen
    }

    async fn generate(&self, request: &ImageRequest) -> ImageResultBatch {
        if request.count == 0 {
            return Vec::new();
        }
        let _timer = timer("imagen generation");
        log::info!(
            "Generating {} image(s) with model: {}",
            request.count,
            self.model
        );

        match self.request_images(request).await {
            Ok(images) => align_batch(images, request.count, NO_IMAGE_ERROR),
            Err(e) => {
                let message = e.detail();
                log::error!(
                    "Image generation failed for prompt: \"{}\": {}",
                    request.prompt,
                    message
                );
                if (self.classifier)(&message) {
                    failed_batch(SAFETY_BLOCKED_ERROR, request.count)
                } else {
                    failed_batch(GENERATION_FAILED_ERROR, request.count)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AspectRatio;

    #[test]
    fn test_payload_omits_blank_negative_prompt() {
        let request = ImageRequest::new("a lighthouse", 2)
            .with_aspect_ratio(AspectRatio::Wide)
            .with_negative_prompt("   ");
        let payload = build_predict_payload(&request);

        assert_eq!(payload["instances"][0]["prompt"], "a lighthouse");
        assert_eq!(payload["parameters"]["sampleCount"], 2);
        assert_eq!(payload["parameters"]["aspectRatio"], "16:9");
        assert_eq!(payload["parameters"]["outputOptions"]["mimeType"], "image/jpeg");
        assert!(payload["parameters"].get("negativePrompt").is_none());
    }

    #[test]
    fn test_payload_trims_negative_prompt() {
        let request = ImageRequest::new("a lighthouse", 1).with_negative_prompt("  blurry, text ");
        let payload = build_predict_payload(&request);
        assert_eq!(payload["parameters"]["negativePrompt"], "blurry, text");
    }
}
