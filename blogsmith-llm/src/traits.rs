use async_trait::async_trait;
use blogsmith_http::HttpError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limit or quota exceeded: {0}")]
    RateLimit(String),

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Content blocked by provider: {0}")]
    Blocked(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<HttpError> for LlmError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Api {
                status, message, ..
            } => match status.as_u16() {
                429 => LlmError::RateLimit(message),
                401 | 403 => LlmError::Auth(message),
                code => LlmError::Api {
                    status: code,
                    message,
                },
            },
            HttpError::Timeout(m) => LlmError::Timeout(m),
            HttpError::Network(m) => LlmError::Network(m),
            HttpError::Decode(m, snippet) => {
                LlmError::Malformed(format!("{m}, body_snippet: {snippet}"))
            }
            HttpError::Url(m) | HttpError::Build(m) => LlmError::Config(m),
        }
    }
}

/// A text-completion capability: prompt in, free text out.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with optional system prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse, LlmError>;

    /// Check if the LLM service is reachable with the configured credentials
    async fn health_check(&self) -> Result<bool, LlmError> {
        match self.generate("Respond with just 'OK'", None, Some(5), Some(0.0)).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(model = self.model_name(), error = %e, "llm.health_check.failed");
                Ok(false)
            }
        }
    }

    /// Get the model name being used
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogsmith_http::HttpError;

    #[test]
    fn timeouts_and_network_failures_keep_their_kind() {
        assert!(matches!(
            LlmError::from(HttpError::Timeout("60s".into())),
            LlmError::Timeout(_)
        ));
        assert!(matches!(
            LlmError::from(HttpError::Network("dns".into())),
            LlmError::Network(_)
        ));
    }

    #[test]
    fn decode_failures_are_malformed_responses() {
        let err = LlmError::from(HttpError::Decode("eof".into(), "{".into()));
        assert!(matches!(err, LlmError::Malformed(_)));
    }
}
