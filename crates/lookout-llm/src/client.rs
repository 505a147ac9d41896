use lookout_core::{Deadline, LlmConfig, Result};

use crate::driver::{GenerateRequest, LlmDriver};

/// Provider-agnostic facade over the active [`LlmDriver`].
///
/// Fixes the response format to plain text and supplies model,
/// temperature, and token cap from the run configuration; per call only
/// the prompt varies.
pub struct LlmClient<D: LlmDriver> {
    driver: D,
    cfg: LlmConfig,
}

impl<D: LlmDriver> LlmClient<D> {
    /// Wrap `driver` with the run configuration.
    pub fn new(driver: D, cfg: LlmConfig) -> Self {
        Self { driver, cfg }
    }

    /// Generate review text for `prompt`.
    ///
    /// An empty generation is valid content, not an error; only driver
    /// failures propagate.
    ///
    /// # Errors
    ///
    /// Driver errors are wrapped with "failed to generate content using
    /// LLM driver", preserving the root cause.
    pub async fn generate_content(&self, deadline: &Deadline, prompt: &str) -> Result<String> {
        let req = GenerateRequest {
            model: self.cfg.model.clone(),
            prompt: prompt.to_string(),
            temperature: self.cfg.temperature,
            max_tokens: self.cfg.max_tokens,
            response_mime_type: "text/plain".to_string(),
        };

        let resp = self
            .driver
            .generate(deadline, req)
            .await
            .map_err(|e| e.context("failed to generate content using LLM driver"))?;

        Ok(resp.content)
    }
}
