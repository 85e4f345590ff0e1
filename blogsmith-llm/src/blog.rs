use crate::traits::{LlmClient, LlmError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("blog generation with `{model}` failed: {source}")]
pub struct GenerationError {
    pub model: String,
    #[source]
    pub source: LlmError,
}

/// Sends one instruction to the completion capability and returns its text as-is.
#[derive(Clone)]
pub struct BlogGenerator {
    client: Arc<dyn LlmClient>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl BlogGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_sampling(mut self, max_tokens: Option<u32>, temperature: Option<f32>) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// One call, no retry, no fallback model. The returned markup is not validated.
    pub async fn generate(&self, instruction: &str) -> Result<String, GenerationError> {
        let model = self.client.model_name().to_string();
        tracing::info!(model=%model, instruction_len=instruction.len(), "blog.generate.start");

        let resp = self
            .client
            .generate(instruction, None, self.max_tokens, self.temperature)
            .await
            .map_err(|source| {
                tracing::warn!(model=%model, error=%source, "blog.generate.failed");
                GenerationError {
                    model: model.clone(),
                    source,
                }
            })?;

        tracing::info!(
            model=%model,
            text_len=resp.text.len(),
            tokens_used=?resp.tokens_used,
            "blog.generate.done"
        );
        Ok(resp.text)
    }
}
