use serde::de::DeserializeOwned;

use crate::errors::TutorError;

/// Best-effort repair for completion responses that wrap JSON in prose or
/// markdown fences.
pub struct ResponseSanitizer;

impl ResponseSanitizer {
    /// Strip code-fence markers and extract the first `{` through the last
    /// `}` of the cleaned text. Returns `None` when no object span exists.
    ///
    /// The extracted span is not validated; callers attempt a parse and
    /// fall back on failure.
    pub fn extract_json(raw: &str) -> Option<String> {
        let cleaned = raw.replace("```json", "").replace("```", "");
        let cleaned = cleaned.trim();

        let start = cleaned.find('{')?;
        let end = cleaned.rfind('}')?;
        if end < start {
            return None;
        }

        Some(cleaned[start..=end].to_string())
    }

    /// Extract and strictly parse a JSON payload from raw completion text.
    pub fn parse_payload<T: DeserializeOwned>(raw: &str) -> Result<T, TutorError> {
        let span = Self::extract_json(raw).ok_or_else(|| {
            TutorError::MalformedPayload("no JSON object found in completion text".to_string())
        })?;

        serde_json::from_str::<T>(&span).map_err(|e| TutorError::MalformedPayload(e.to_string()))
    }
}
