use lookout_core::{Deadline, Error, LlmConfig, Result};

use crate::gemini::GeminiDriver;

/// A normalized generation request sent to any backend.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Model identifier.
    pub model: String,
    /// The full prompt text.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Cap on output tokens.
    pub max_tokens: u32,
    /// Desired response format, e.g. `"text/plain"`.
    pub response_mime_type: String,
}

/// The generated text.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// Generated content; may legitimately be empty.
    pub content: String,
}

/// Capability set every model backend driver implements.
///
/// Backend errors (quota, invalid model, auth, network) surface unmodified
/// apart from a prefix identifying the driver. Every call observes the
/// shared run [`Deadline`].
#[allow(async_fn_in_trait)]
pub trait LlmDriver {
    /// Generate text for the request's prompt.
    async fn generate(&self, deadline: &Deadline, req: GenerateRequest)
        -> Result<GenerateResponse>;
}

/// The model backend selected once at startup, dispatched by enum.
///
/// # Examples
///
/// ```
/// use lookout_core::LlmConfig;
/// use lookout_llm::AnyLlmDriver;
///
/// let cfg = LlmConfig {
///     provider: "palantir".into(),
///     api_key: "key".into(),
///     ..LlmConfig::default()
/// };
/// let err = AnyLlmDriver::from_config(&cfg).unwrap_err();
/// assert!(err.to_string().contains("unsupported LLM provider"));
/// ```
#[derive(Debug)]
pub enum AnyLlmDriver {
    /// Google Gemini over the `generateContent` REST API.
    Gemini(GeminiDriver),
}

impl AnyLlmDriver {
    /// Build the driver named by `cfg.provider`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown provider name, or the
    /// driver's own construction error (e.g. a missing API key).
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        match cfg.provider.as_str() {
            "gemini" => Ok(Self::Gemini(GeminiDriver::new(&cfg.api_key)?)),
            other => Err(Error::Config(format!("unsupported LLM provider: {other}"))),
        }
    }
}

impl LlmDriver for AnyLlmDriver {
    async fn generate(
        &self,
        deadline: &Deadline,
        req: GenerateRequest,
    ) -> Result<GenerateResponse> {
        match self {
            Self::Gemini(d) => d.generate(deadline, req).await,
        }
    }
}
