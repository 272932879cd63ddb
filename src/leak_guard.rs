use anyhow::Result;
use regex::Regex;
use std::time::Duration;
use tracing::{info, warn};

use crate::llm_client::{CompletionBackend, FallbackClient};

/// Canned deflection substituted when a rewrite still reveals the answer.
pub const DEFLECTION: &str = "I can't give that away. Tell me what you already \
know about this topic and we'll reason through it together.";

/// Answer-reveal phrasings the tutoring path must never return. Heuristic
/// filter, not a security boundary: paraphrased reveals without these
/// keywords slip through, and that limitation is accepted.
const LEAK_PATTERNS: [&str; 4] = [
    r"(?i)\bthe\s+answer\s+is\b",
    r"(?i)\bcorrect\s+answer\b",
    r"(?i)\bit'?s\s+option\s+[a-d]\b",
    r"(?i)\boption\s+[a-d]\b",
];

/// Pattern-matches tutoring responses for answer reveals and runs a bounded
/// rewrite-then-deflect sequence on a match.
#[derive(Debug, Clone)]
pub struct LeakGuard {
    patterns: Vec<Regex>,
}

impl LeakGuard {
    pub fn new() -> Result<Self> {
        let patterns = LEAK_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether the text matches any leak pattern.
    pub fn detect(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }

    /// Return `response` if clean; otherwise rewrite once at a lower
    /// temperature and re-check, falling back to the canned deflection.
    ///
    /// Never returns text matching the leak patterns. Exactly one rewrite
    /// attempt is made; a failed rewrite finalizes against the original
    /// (still-leaking) text and deflects.
    pub async fn guard<B: CompletionBackend>(
        &self,
        response: &str,
        client: &FallbackClient<B>,
        temperature: f32,
        timeout: Duration,
    ) -> String {
        if !self.detect(response) {
            return response.to_string();
        }

        warn!(
            response_length = response.len(),
            "Tutoring response leaks an answer, requesting rewrite"
        );

        let rewrite_prompt = format!(
            r#"The following tutoring response reveals a quiz answer, which is not allowed.
Rewrite it so it guides the student toward the concept without stating the answer,
the option letter, or any equivalent giveaway. Respond with the rewritten text only.

Response to rewrite:
{}"#,
            response
        );

        let rewritten = match client
            .complete(&rewrite_prompt, temperature * 0.5, timeout)
            .await
        {
            Ok(completion) => completion.text,
            Err(e) => {
                warn!(error = %e, "Rewrite request failed, finalizing against original text");
                response.to_string()
            }
        };

        if self.detect(&rewritten) {
            info!("Rewritten response still leaks, substituting deflection");
            DEFLECTION.to_string()
        } else {
            rewritten
        }
    }
}
