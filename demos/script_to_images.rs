use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::join_all;
use scriptvision::{
    logger, AspectRatio, GeminiClient, GenerationRequest, ImageGenerator, ImageRequest,
    StabilityClient, StyleImage,
};
use std::{env, fs, path::Path};

// Usage: script_to_images <script.txt> [reference-image] [imagen|stability]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!(".env file loaded"),
        Err(_) => log::warn!("No .env file found, using system environment variables"),
    }
    logger::init_with_config(logger::LoggerConfig::development())?;

    let args: Vec<String> = env::args().skip(1).collect();
    let script_path = args.first().ok_or("usage: script_to_images <script.txt>")?;
    let script = fs::read_to_string(script_path)?;

    let gemini = GeminiClient::from_env()?;

    let mut style = "cinematic, dramatic lighting, photorealistic".to_string();
    if let Some(reference) = args.get(1) {
        let mime_type = match Path::new(reference).extension().and_then(|e| e.to_str()) {
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            _ => "image/jpeg",
        };
        let image = StyleImage::from_bytes(&fs::read(reference)?, mime_type);
        match gemini.text().analyze_image_style(&image).await {
            Ok(derived) => style = derived,
            Err(e) => log::warn!("{}", e),
        }
    }
    log::info!("Visual style: {}", style);

    let request = GenerationRequest::new(script, style, 4);
    let result = gemini.text().generate_prompts(&request).await?;

    let stability = StabilityClient::from_env();
    let generator: &dyn ImageGenerator = match args.get(2).map(String::as_str) {
        Some("stability") => stability.image(),
        _ => gemini.image(),
    };
    log::info!("Rendering with {}", generator.provider().name());

    let requests: Vec<ImageRequest> = result
        .prompts
        .iter()
        .map(|prompt| {
            ImageRequest::new(prompt.clone(), 1)
                .with_aspect_ratio(AspectRatio::Wide)
                .with_negative_prompt("text, watermark")
        })
        .collect();
    let batches = join_all(requests.iter().map(|r| generator.generate(r))).await;

    for (scene, batch) in batches.iter().enumerate() {
        for (slot, image) in batch.iter().enumerate() {
            match (image.base64(), image.error()) {
                (Some(data), _) => {
                    let filename = format!("scene_{:02}_{}.jpg", scene + 1, slot + 1);
                    fs::write(&filename, STANDARD.decode(data)?)?;
                    log::info!("Saved {}", filename);
                }
                (None, error) => {
                    log::error!("Scene {} slot {}: {}", scene + 1, slot + 1, error.unwrap_or(""))
                }
            }
        }
    }

    Ok(())
}
