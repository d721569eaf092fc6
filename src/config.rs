use std::env;
use std::time::Duration;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";

pub const STABILITY_BASE_URL: &str = "https://api.stability.ai";
pub const DEFAULT_STABILITY_ENGINE: &str = "sd3";

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub timeout: Option<Duration>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            base_url: GEMINI_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout: None,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `API_KEY` (or `GEMINI_API_KEY`) plus optional endpoint and model overrides.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        GeminiConfig {
            api_key: non_empty_var("API_KEY").or_else(|| non_empty_var("GEMINI_API_KEY")),
            base_url: non_empty_var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            text_model: non_empty_var("GEMINI_TEXT_MODEL").unwrap_or(defaults.text_model),
            image_model: non_empty_var("GEMINI_IMAGE_MODEL").unwrap_or(defaults.image_model),
            timeout: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone)]
pub struct StabilityConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub engine: String,
    pub timeout: Option<Duration>,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        StabilityConfig {
            api_key: None,
            base_url: STABILITY_BASE_URL.to_string(),
            engine: DEFAULT_STABILITY_ENGINE.to_string(),
            timeout: None,
        }
    }
}

impl StabilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        StabilityConfig {
            api_key: non_empty_var("STABILITY_API_KEY"),
            base_url: non_empty_var("STABILITY_BASE_URL").unwrap_or(defaults.base_url),
            engine: non_empty_var("STABILITY_ENGINE").unwrap_or(defaults.engine),
            timeout: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub stability: StabilityConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            gemini: GeminiConfig::from_env(),
            stability: StabilityConfig::from_env(),
        }
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_stability(mut self, config: StabilityConfig) -> Self {
        self.stability = config;
        self
    }
}

pub(crate) fn build_http_client(timeout: Option<Duration>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().unwrap_or_else(|e| {
        log::warn!("Falling back to default HTTP client: {}", e);
        reqwest::Client::new()
    })
}
