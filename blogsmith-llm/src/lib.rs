//! Provider-agnostic text generation for Blogsmith.
//!
//! This crate exposes a common [`traits::LlmClient`] interface with Gemini
//! and OpenAI implementations, the blog [`prompt`] template, and the
//! [`blog::BlogGenerator`] that ties the two together.
//!
//! # Examples
//! ```no_run
//! use blogsmith_config::BlogsmithConfigLoader;
//! use blogsmith_llm::build_blog_generator;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let cfg = BlogsmithConfigLoader::new()
//!     .with_yaml_str("llm:\n  provider: gemini\n  api_key: secret\n")
//!     .load()?;
//! let generator = build_blog_generator(&cfg.llm)?;
//! let html = generator.generate("Write a haiku in <p> tags").await?;
//! # let _ = html;
//! # Ok(())
//! # }
//! ```
pub mod blog;
pub mod gemini;
pub mod openai;
pub mod prompt;
pub mod traits;

use blog::BlogGenerator;
use blogsmith_common::{BlogsmithError, Result};
use blogsmith_config::LlmConfig;
use gemini::GeminiClient;
use openai::OpenAiClient;
use std::sync::Arc;
use traits::LlmClient;

pub use blog::GenerationError;
pub use prompt::build_prompt;

/// Construct the completion client described by `config`.
pub fn build_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let client: Arc<dyn LlmClient> = match config {
        LlmConfig::Gemini {
            api_key,
            model,
            endpoint,
            ..
        } => Arc::new(
            GeminiClient::with_endpoint(api_key.clone(), model.clone(), endpoint)
                .map_err(|e| BlogsmithError::Config(e.to_string()))?,
        ),
        LlmConfig::Openai {
            api_key,
            model,
            endpoint,
            ..
        } => Arc::new(
            OpenAiClient::with_endpoint(api_key.clone(), model.clone(), endpoint)
                .map_err(|e| BlogsmithError::Config(e.to_string()))?,
        ),
    };
    tracing::debug!(model = client.model_name(), "llm.client.ready");
    Ok(client)
}

/// Client plus the configured sampling knobs.
pub fn build_blog_generator(config: &LlmConfig) -> Result<BlogGenerator> {
    let (max_tokens, temperature) = match config {
        LlmConfig::Gemini {
            max_tokens,
            temperature,
            ..
        }
        | LlmConfig::Openai {
            max_tokens,
            temperature,
            ..
        } => (*max_tokens, *temperature),
    };
    Ok(BlogGenerator::new(build_llm_client(config)?).with_sampling(max_tokens, temperature))
}
