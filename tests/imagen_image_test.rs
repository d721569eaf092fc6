use scriptvision::{
    AspectRatio, GeminiClient, GeminiConfig, ImageGenerator, ImageRequest, FEWER_IMAGES_ERROR,
};
use scriptvision::gemini::image_client::{
    GENERATION_FAILED_ERROR, NO_IMAGE_ERROR, SAFETY_BLOCKED_ERROR,
};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PREDICT_PATH: &str = "/v1beta/models/imagen-3.0-generate-002:predict";

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::new(
        GeminiConfig::new()
            .with_api_key("test-api-key")
            .with_base_url(server.uri()),
    )
    .unwrap()
}

fn predictions(n: usize) -> Value {
    let items: Vec<Value> = (0..n)
        .map(|i| json!({ "bytesBase64Encoded": format!("img-{}", i), "mimeType": "image/jpeg" }))
        .collect();
    json!({ "predictions": items })
}

async fn mount(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn sends_imagen_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .and(header("x-goog-api-key", "test-api-key"))
        .and(body_json(json!({
            "instances": [{ "prompt": "a cat" }],
            "parameters": {
                "sampleCount": 2,
                "aspectRatio": "9:16",
                "outputOptions": { "mimeType": "image/jpeg" },
                "negativePrompt": "blurry"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(predictions(2)))
        .expect(1)
        .mount(&server)
        .await;

    let request = ImageRequest::new("a cat", 2)
        .with_aspect_ratio(AspectRatio::Tall)
        .with_negative_prompt(" blurry ");
    let batch = client(&server).image().generate(&request).await;

    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].base64(), Some("img-0"));
    assert_eq!(batch[1].base64(), Some("img-1"));
}

#[tokio::test]
async fn partial_result_is_padded() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_json(predictions(1))).await;

    let batch = client(&server)
        .image()
        .generate_image("a cat", AspectRatio::Square, None, 3)
        .await;

    assert_eq!(batch.len(), 3);
    assert!(batch[0].is_success());
    assert_eq!(batch[1].error(), Some(FEWER_IMAGES_ERROR));
    assert_eq!(batch[2].error(), Some(FEWER_IMAGES_ERROR));
}

#[tokio::test]
async fn filtered_predictions_count_as_missing() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [
                { "raiFilteredReason": "Filtered by safety settings" },
                { "bytesBase64Encoded": "img-1" }
            ]
        })),
    )
    .await;

    let batch = client(&server).image().generate(&ImageRequest::new("a cat", 2)).await;
    assert_eq!(batch[0].base64(), Some("img-1"));
    assert_eq!(batch[1].error(), Some(FEWER_IMAGES_ERROR));
}

#[tokio::test]
async fn empty_result_fills_every_slot() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let batch = client(&server).image().generate(&ImageRequest::new("a cat", 4)).await;
    assert_eq!(batch.len(), 4);
    assert!(batch.iter().all(|slot| slot.error() == Some(NO_IMAGE_ERROR)));
}

#[tokio::test]
async fn safety_rejection_is_classified() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "Image generation failed with the following error: The prompt could not be submitted. This prompt contains sensitive words that violate Google's Responsible AI practices.",
                "status": "INVALID_ARGUMENT"
            }
        })),
    )
    .await;

    let batch = client(&server).image().generate(&ImageRequest::new("a cat", 2)).await;
    assert_eq!(batch.len(), 2);
    assert!(batch.iter().all(|slot| slot.error() == Some(SAFETY_BLOCKED_ERROR)));
}

#[tokio::test]
async fn other_failures_are_generic() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" }
        })),
    )
    .await;

    let batch = client(&server).image().generate(&ImageRequest::new("a cat", 3)).await;
    assert_eq!(batch.len(), 3);
    assert!(batch
        .iter()
        .all(|slot| slot.error() == Some(GENERATION_FAILED_ERROR) && slot.base64().is_none()));
}

#[tokio::test]
async fn classifier_can_be_replaced() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "PROMPT_BLOCKED: policy" }
        })),
    )
    .await;

    let image = client(&server)
        .image()
        .clone()
        .with_safety_classifier(Arc::new(|message: &str| message.starts_with("PROMPT_BLOCKED")));
    let batch = image.generate(&ImageRequest::new("a cat", 1)).await;
    assert_eq!(batch[0].error(), Some(SAFETY_BLOCKED_ERROR));
}

#[tokio::test]
async fn zero_images_skips_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(predictions(1)))
        .expect(0)
        .mount(&server)
        .await;

    let batch = client(&server).image().generate(&ImageRequest::new("a cat", 0)).await;
    assert!(batch.is_empty());
}
