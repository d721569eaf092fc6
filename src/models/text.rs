use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub script: String,
    pub style: String,
    pub niche: Option<String>,
    pub num_prompts: u32,
}

impl GenerationRequest {
    pub fn new(script: impl Into<String>, style: impl Into<String>, num_prompts: u32) -> Self {
        Self {
            script: script.into(),
            style: style.into(),
            niche: None,
            num_prompts,
        }
    }

    pub fn with_niche(mut self, niche: impl Into<String>) -> Self {
        self.niche = Some(niche.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptResult {
    /// Prompts in the order the provider produced them.
    pub prompts: Vec<String>,
    /// The full instruction text that was sent, kept for auditing.
    pub request_prompt: String,
}

/// Reference image for style analysis, already base64 encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleImage {
    pub base64: String,
    pub mime_type: String,
}

impl StyleImage {
    pub fn new(base64: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            base64: base64.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(STANDARD.encode(bytes), mime_type)
    }
}

// Gemini generateContent wire types.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentPart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, `None` when there is none.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }
}
