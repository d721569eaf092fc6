//! Script-to-image provider adapters.
//!
//! [`GeminiClient`] turns a script into image prompts, derives style keywords
//! from a reference image and renders prompts with Imagen.
//! [`StabilityClient`] renders prompts with Stability AI. Both image backends
//! implement [`ImageGenerator`] and always return one [`ImageResult`] per
//! requested image.

pub mod config;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod logger;
pub mod models;
pub mod safety;
pub mod stability;

pub use config::{Config, GeminiConfig, StabilityConfig};
pub use error::{GenAiError, Result};
pub use gemini::GeminiClient;
pub use generator::ImageGenerator;
pub use models::*;
pub use safety::{is_safety_block, SafetyClassifier};
pub use stability::StabilityClient;
