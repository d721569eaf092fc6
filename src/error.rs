use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // User-facing classifications. Their Display text is what callers show.
    #[error("The script or style contains content that violates safety policies. Please revise your input and try again.")]
    SafetyBlocked,
    #[error("The response was blocked due to potential recitation issues. Try rephrasing your script.")]
    RecitationBlocked,
    #[error("Prompt generation stopped unexpectedly. Reason: {0}. Please check your script content.")]
    StoppedUnexpectedly(String),
    #[error("The AI returned an empty response. This can happen if the script is too short, vague, or contains content that goes against the safety policy.")]
    EmptyResponse,
    #[error("The AI returned a response that was not valid JSON. This may be a temporary issue, please try again.")]
    InvalidJson,
    #[error("The AI returned a response with an invalid structure. Please try again.")]
    InvalidStructure,
    #[error("Failed to generate prompts from the script due to an unexpected AI service error.")]
    UnexpectedServiceError,
    #[error("Failed to analyze the reference image style.")]
    StyleAnalysisFailed,
}

impl GenAiError {
    /// True for errors whose message is meant to reach the end user as-is.
    pub fn is_classified(&self) -> bool {
        matches!(
            self,
            GenAiError::SafetyBlocked
                | GenAiError::RecitationBlocked
                | GenAiError::StoppedUnexpectedly(_)
                | GenAiError::EmptyResponse
                | GenAiError::InvalidJson
                | GenAiError::InvalidStructure
                | GenAiError::UnexpectedServiceError
                | GenAiError::StyleAnalysisFailed
        )
    }
}

impl GenAiError {
    /// The underlying detail without the category prefix.
    pub fn detail(&self) -> String {
        match self {
            GenAiError::ConfigError(msg)
            | GenAiError::RequestError(msg)
            | GenAiError::ResponseError(msg)
            | GenAiError::SerializationError(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for GenAiError {
    fn from(err: reqwest::Error) -> Self {
        GenAiError::RequestError(err.to_string())
    }
}

impl From<serde_json::Error> for GenAiError {
    fn from(err: serde_json::Error) -> Self {
        GenAiError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenAiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_unexpectedly_names_reason() {
        let err = GenAiError::StoppedUnexpectedly("MAX_TOKENS".to_string());
        assert!(err.to_string().contains("MAX_TOKENS"));
        assert!(err.is_classified());
    }

    #[test]
    fn test_transport_errors_are_not_classified() {
        assert!(!GenAiError::RequestError("connection reset".into()).is_classified());
        assert!(!GenAiError::ConfigError("missing key".into()).is_classified());
    }

    #[test]
    fn test_detail_strips_category() {
        let err = GenAiError::ResponseError("quota exceeded".into());
        assert_eq!(err.to_string(), "Response error: quota exceeded");
        assert_eq!(err.detail(), "quota exceeded");
    }

    #[test]
    fn test_json_and_structure_messages_differ() {
        assert_ne!(
            GenAiError::InvalidJson.to_string(),
            GenAiError::InvalidStructure.to_string()
        );
    }
}
