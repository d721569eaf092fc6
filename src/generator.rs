use crate::models::{AspectRatio, ImageProvider, ImageRequest, ImageResultBatch};
use async_trait::async_trait;

/// Common surface of the image backends so callers can pick one at runtime.
///
/// Implementations never fail: every outcome, including transport errors,
/// is reported inside a batch whose length equals `request.count`.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn provider(&self) -> ImageProvider;

    async fn generate(&self, request: &ImageRequest) -> ImageResultBatch;

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        negative_prompt: Option<&str>,
        num_images: u32,
    ) -> ImageResultBatch {
        let mut request = ImageRequest::new(prompt, num_images).with_aspect_ratio(aspect_ratio);
        request.negative_prompt = negative_prompt.map(String::from);
        self.generate(&request).await
    }
}
