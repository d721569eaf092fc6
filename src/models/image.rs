use serde::{Deserialize, Serialize};

use super::common::AspectRatio;

pub const FEWER_IMAGES_ERROR: &str = "API returned fewer images than requested.";

#[derive(Debug, Clone, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    pub negative_prompt: Option<String>,
    pub count: u32,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>, count: u32) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: AspectRatio::default(),
            negative_prompt: None,
            count,
        }
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }
}

/// One requested image slot: either image data or the reason it is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageResult {
    base64: Option<String>,
    error: Option<String>,
}

impl ImageResult {
    pub fn image(base64: impl Into<String>) -> Self {
        Self {
            base64: Some(base64.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            base64: None,
            error: Some(error.into()),
        }
    }

    pub fn base64(&self) -> Option<&str> {
        self.base64.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.base64.is_some()
    }
}

/// Always exactly as long as the number of images requested.
pub type ImageResultBatch = Vec<ImageResult>;

/// `count` copies of the same failure.
pub fn failed_batch(error: &str, count: u32) -> ImageResultBatch {
    (0..count).map(|_| ImageResult::failed(error)).collect()
}

/// Maps returned images onto `count` slots. Empty payloads are discarded,
/// missing slots get `FEWER_IMAGES_ERROR`, and with nothing usable the whole
/// batch carries `empty_error`.
pub fn align_batch<I>(images: I, count: u32, empty_error: &str) -> ImageResultBatch
where
    I: IntoIterator<Item = String>,
{
    let mut results: ImageResultBatch = images
        .into_iter()
        .filter(|b64| !b64.is_empty())
        .take(count as usize)
        .map(ImageResult::image)
        .collect();

    if results.is_empty() {
        return failed_batch(empty_error, count);
    }

    if results.len() < count as usize {
        log::warn!(
            "Provider returned {} of {} requested images",
            results.len(),
            count
        );
    }
    results.resize(count as usize, ImageResult::failed(FEWER_IMAGES_ERROR));
    results
}

// Imagen :predict wire types.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagenPredictResponse {
    #[serde(default)]
    pub predictions: Vec<ImagenPrediction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagenPrediction {
    #[serde(rename = "bytesBase64Encoded")]
    pub bytes_base64_encoded: Option<String>,
    #[serde(rename = "raiFilteredReason")]
    pub rai_filtered_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleErrorResponse {
    pub error: Option<GoogleErrorBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleErrorBody {
    pub message: Option<String>,
    pub status: Option<String>,
}

// Stability v2beta wire types.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StabilityImagesResponse {
    #[serde(default)]
    pub images: Vec<StabilityImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StabilityImage {
    #[serde(default)]
    pub base64: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StabilityErrorResponse {
    #[serde(default)]
    pub errors: Vec<String>,
}
