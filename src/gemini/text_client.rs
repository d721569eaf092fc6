use crate::{
    error::{GenAiError, Result},
    gemini::GeminiTransport,
    logger::timer,
    models::{common::non_blank, GenerateContentResponse, GenerationRequest, PromptResult, StyleImage},
};
use serde_json::{json, Value};

const STYLE_ANALYSIS_INSTRUCTION: &str = "Analyze the artistic style of this image. Describe the style in a concise, comma-separated list of keywords and phrases suitable for a text-to-image AI. Focus on elements like lighting, color palette, composition, medium (e.g., photograph, oil painting), and overall mood. Do not use full sentences. Example: cinematic, dramatic lighting, high contrast, muted color palette, photorealistic, shallow depth of field, moody atmosphere.";

const EXAMPLE_RESPONSE: &str = r#"{
  "prompts": [
    "A lone astronaut stands on a desolate red planet, facing a swirling dust storm under a dim sun. Cinematic lighting casts long, dramatic shadows. The style is reminiscent of Denis Villeneuve's 'Dune'.",
    "Extreme close-up on the astronaut's cracked helmet visor. The glass reflects a tiny, distant blue Earth, a stark contrast to the harsh alien landscape. The image is hyperrealistic, with visible dust particles floating in the foreground."
  ]
}"#;

/// Schema handed to the model so its decoder enforces `{"prompts": [string]}`.
pub fn prompt_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "prompts": {
                "type": "ARRAY",
                "items": {
                    "type": "STRING",
                    "description": "A single, descriptive prompt for generating an image based on a scene from the script."
                }
            }
        },
        "required": ["prompts"]
    })
}

/// Renders the full instruction sent for prompt generation.
pub fn build_prompt_instruction(request: &GenerationRequest) -> String {
    let niche_line = non_blank(request.niche.as_deref())
        .map(|niche| format!("- **Storytelling Topic/Niche:** {}\n", niche))
        .unwrap_or_default();
    let min_prompts = request.num_prompts.max(1);

    format!(
        r#"System Instruction: You are an expert script analyst and creative director. Your job is to read a script, break it down into key visual moments, and generate safe, detailed prompts for a text-to-image AI.

User Request:
I have a script that needs to be visualized. Please generate a series of image prompts based on it.

**Context & Style:**
{niche_line}- **Visual Style:** {style}

**CRITICAL INSTRUCTIONS:**
1.  **Analyze and Breakdown:** Read the script and divide it into logical scenes or distinct visual moments.
2.  **Quantity and Generation:** You MUST generate at least {min_prompts} unique and detailed prompts in total. If the script has fewer distinct visual moments than this number, create multiple, distinct creative variations for the most important scenes to meet this minimum requirement.
3.  **Adherence to Style:** Each prompt MUST be detailed and strictly adhere to the provided **Visual Style** and incorporate the **Storytelling Topic/Niche** (if provided).
4.  **IMPORTANT SAFETY RULE:** You MUST generate prompts that are safe and appropriate for a general audience. Do not describe or imply violence, explicit situations, or sensitive interactions, especially those involving minors, even if historically accurate. If the script contains such themes, you MUST represent them abstractly or symbolically. Focus on setting, atmosphere, and emotion. For example, to show tension, describe "long, distorted shadows in a dimly lit room" instead of a direct confrontation. Failure to follow this rule will result in an invalid response.
5.  **Output Format:** Your entire response MUST be a valid JSON object with a single key "prompts", which is an array of strings. Each string in the array is a single image prompt. Do not add any commentary, explanations, or markdown formatting around the JSON.

**Example Response:**
{example}

**SCRIPT TO ANALYZE:**
---
{script}
---
"#,
        niche_line = niche_line,
        style = request.style,
        min_prompts = min_prompts,
        example = EXAMPLE_RESPONSE,
        script = request.script,
    )
}

/// Turns a generateContent response into the prompt list, classifying every
/// way it can be unusable.
pub fn parse_prompt_response(response: &GenerateContentResponse) -> Result<Vec<String>> {
    let text = match response.text() {
        Some(text) => text,
        None => {
            log::error!(
                "AI response text is empty (finish reason: {:?})",
                response.finish_reason()
            );
            return Err(match response.finish_reason() {
                Some("SAFETY") => GenAiError::SafetyBlocked,
                Some("RECITATION") => GenAiError::RecitationBlocked,
                Some(reason) if reason != "STOP" => {
                    GenAiError::StoppedUnexpectedly(reason.to_string())
                }
                _ => GenAiError::EmptyResponse,
            });
        }
    };

    let value: Value = serde_json::from_str(&text).map_err(|e| {
        log::error!("Failed to parse AI response as JSON: {} ({})", text, e);
        GenAiError::InvalidJson
    })?;

    let prompts = value
        .get("prompts")
        .and_then(Value::as_array)
        .ok_or(GenAiError::InvalidStructure)?;

    prompts
        .iter()
        .map(|p| p.as_str().map(String::from).ok_or(GenAiError::InvalidStructure))
        .collect()
}

#[derive(Clone)]
pub struct TextClient {
    transport: GeminiTransport,
    model: String,
}

impl TextClient {
    pub fn new(transport: GeminiTransport, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate_prompts(&self, request: &GenerationRequest) -> Result<PromptResult> {
        let request_prompt = build_prompt_instruction(request);
        let _timer = timer("prompt generation");

        log::info!(
            "Generating at least {} prompts with model: {}",
            request.num_prompts.max(1),
            self.model
        );

        match self.request_prompts(&request_prompt).await {
            Ok(prompts) => {
                log::info!("Received {} prompts", prompts.len());
                Ok(PromptResult {
                    prompts,
                    request_prompt,
                })
            }
            Err(e) if e.is_classified() => {
                log::error!("Prompt generation rejected: {}", e);
                Err(e)
            }
            Err(e) => {
                log::error!("Error during prompt generation: {}", e);
                Err(GenAiError::UnexpectedServiceError)
            }
        }
    }

    async fn request_prompts(&self, request_prompt: &str) -> Result<Vec<String>> {
        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request_prompt }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": prompt_schema()
            }
        });

        let response: GenerateContentResponse = self
            .transport
            .post_json(&self.model, "generateContent", &payload)
            .await?;

        parse_prompt_response(&response)
    }

    pub async fn analyze_image_style(&self, image: &StyleImage) -> Result<String> {
        let _timer = timer("style analysis");

        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": image.mime_type,
                            "data": image.base64
                        }
                    },
                    { "text": STYLE_ANALYSIS_INSTRUCTION }
                ]
            }]
        });

        let response = self
            .transport
            .post_json::<GenerateContentResponse>(&self.model, "generateContent", &payload)
            .await
            .map_err(|e| {
                log::error!("Error analyzing image style: {}", e);
                GenAiError::StyleAnalysisFailed
            })?;

        match response.text().map(|t| t.trim().to_string()) {
            Some(style) if !style.is_empty() => Ok(style),
            _ => {
                log::error!(
                    "Style analysis returned no text (finish reason: {:?})",
                    response.finish_reason()
                );
                Err(GenAiError::StyleAnalysisFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with(text: Option<&str>, finish_reason: Option<&str>) -> GenerateContentResponse {
        let mut candidate = json!({});
        if let Some(text) = text {
            candidate["content"] = json!({ "parts": [{ "text": text }] });
        }
        if let Some(reason) = finish_reason {
            candidate["finishReason"] = json!(reason);
        }
        serde_json::from_value(json!({ "candidates": [candidate] })).unwrap()
    }

    #[test]
    fn test_niche_clause_only_when_present() {
        let plain = GenerationRequest::new("A knight rides out.", "oil painting", 3);
        let text = build_prompt_instruction(&plain);
        assert!(!text.contains("Storytelling Topic/Niche:**"));
        assert!(text.contains("- **Visual Style:** oil painting"));

        let blank = plain.clone().with_niche("   ");
        assert!(!build_prompt_instruction(&blank).contains("Storytelling Topic/Niche:**"));

        let niche = plain.with_niche("medieval history");
        assert!(build_prompt_instruction(&niche)
            .contains("- **Storytelling Topic/Niche:** medieval history\n"));
    }

    #[test]
    fn test_instruction_embeds_count_and_script() {
        let request = GenerationRequest::new("The ship sank at dawn.", "noir", 7);
        let text = build_prompt_instruction(&request);
        assert!(text.contains("at least 7 unique and detailed prompts"));
        assert!(text.contains("---\nThe ship sank at dawn.\n---"));
        assert!(text.contains("abstractly or symbolically"));
        assert!(text.contains(r#"single key "prompts""#));
    }

    #[test]
    fn test_zero_count_still_asks_for_one() {
        let request = GenerationRequest::new("x", "y", 0);
        assert!(build_prompt_instruction(&request).contains("at least 1 unique"));
    }

    #[test]
    fn test_valid_prompts_returned_in_order() {
        let response = response_with(Some(r#"{"prompts": ["a","b","c"]}"#), Some("STOP"));
        assert_eq!(parse_prompt_response(&response).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_response_classification() {
        let cases = [
            (Some("SAFETY"), GenAiError::SafetyBlocked.to_string()),
            (Some("RECITATION"), GenAiError::RecitationBlocked.to_string()),
            (Some("STOP"), GenAiError::EmptyResponse.to_string()),
            (None, GenAiError::EmptyResponse.to_string()),
        ];
        for (reason, expected) in cases {
            let err = parse_prompt_response(&response_with(None, reason)).unwrap_err();
            assert_eq!(err.to_string(), expected);
        }

        let err = parse_prompt_response(&response_with(None, Some("MAX_TOKENS"))).unwrap_err();
        assert!(matches!(err, GenAiError::StoppedUnexpectedly(ref r) if r == "MAX_TOKENS"));
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn test_no_candidates_is_empty_response() {
        let response = GenerateContentResponse::default();
        assert!(matches!(
            parse_prompt_response(&response),
            Err(GenAiError::EmptyResponse)
        ));
    }

    #[test]
    fn test_invalid_json_and_structure_are_distinct() {
        let bad_json = parse_prompt_response(&response_with(Some("here you go: ["), None));
        assert!(matches!(bad_json, Err(GenAiError::InvalidJson)));

        let missing = parse_prompt_response(&response_with(Some(r#"{"scenes": []}"#), None));
        assert!(matches!(missing, Err(GenAiError::InvalidStructure)));

        let not_array = parse_prompt_response(&response_with(Some(r#"{"prompts": "a"}"#), None));
        assert!(matches!(not_array, Err(GenAiError::InvalidStructure)));

        let mixed = parse_prompt_response(&response_with(Some(r#"{"prompts": ["a", 2]}"#), None));
        assert!(matches!(mixed, Err(GenAiError::InvalidStructure)));
    }

    #[test]
    fn test_schema_requires_prompts_array() {
        let schema = prompt_schema();
        assert_eq!(schema["required"], json!(["prompts"]));
        assert_eq!(schema["properties"]["prompts"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["prompts"]["items"]["type"], "STRING");
    }
}
