//! Content generation on top of an LLM client.

use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::config::LlmConfig;
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::metrics;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Empty response from {0}")]
    EmptyResponse(String),
}

/// Produces text for a prompt. The publish orchestrator and the content
/// endpoints only depend on this seam, which keeps them testable without a
/// live model.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}

/// LLM-backed generator carrying the configured sampling parameters.
pub struct LlmContentGenerator {
    client: Box<dyn LlmClient>,
    max_tokens: u32,
    temperature: f32,
}

impl LlmContentGenerator {
    pub fn new(client: Box<dyn LlmClient>, config: &LlmConfig) -> Self {
        Self {
            client,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl ContentGenerator for LlmContentGenerator {
    fn name(&self) -> &str {
        self.client.provider()
    }

    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        let provider = self.client.provider();
        let request = CompletionRequest::new(prompt)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        let start = Instant::now();
        let result = self.client.complete(request).await;
        metrics::LLM_REQUEST_DURATION
            .with_label_values(&[provider])
            .observe(start.elapsed().as_secs_f64());

        let response = match result {
            Ok(response) => {
                metrics::LLM_REQUESTS
                    .with_label_values(&[provider, "success"])
                    .inc();
                response
            }
            Err(e) => {
                metrics::LLM_REQUESTS
                    .with_label_values(&[provider, "error"])
                    .inc();
                return Err(e.into());
            }
        };

        metrics::LLM_TOKENS
            .with_label_values(&[provider, "input"])
            .inc_by(u64::from(response.usage.input_tokens));
        metrics::LLM_TOKENS
            .with_label_values(&[provider, "output"])
            .inc_by(u64::from(response.usage.output_tokens));

        debug!(
            provider,
            model = response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "completion received"
        );

        let text = response.text.trim();
        if text.is_empty() {
            return Err(GeneratorError::EmptyResponse(provider.to_string()));
        }

        Ok(text.to_string())
    }
}
