use lookout_core::{Deadline, Error, Result};
use serde::Deserialize;

use crate::driver::{GenerateRequest, GenerateResponse, LlmDriver};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini driver over the `models/{model}:generateContent` REST API.
///
/// # Examples
///
/// ```
/// use lookout_llm::gemini::GeminiDriver;
///
/// assert!(GeminiDriver::new("AIza-test").is_ok());
/// assert!(GeminiDriver::new("").is_err());
/// ```
#[derive(Debug)]
pub struct GeminiDriver {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiDriver {
    /// Create a driver from an API key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the key is empty; a missing credential
    /// fails at startup, not at the first generation call.
    pub fn new(api_key: &str) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("gemini api key is missing".into()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            api_base: GEMINI_API_BASE.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Point the driver at a different API base (tests, proxies).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }
}

impl LlmDriver for GeminiDriver {
    async fn generate(
        &self,
        deadline: &Deadline,
        req: GenerateRequest,
    ) -> Result<GenerateResponse> {
        deadline
            .bound(async {
                let url = format!(
                    "{}/models/{}:generateContent?key={}",
                    self.api_base.trim_end_matches('/'),
                    req.model,
                    self.api_key
                );

                let payload = serde_json::json!({
                    "contents": [
                        {
                            "role": "user",
                            "parts": [{"text": req.prompt}]
                        }
                    ],
                    "generationConfig": {
                        "temperature": req.temperature,
                        "maxOutputTokens": req.max_tokens,
                        "responseMimeType": req.response_mime_type,
                    }
                });

                let response = self
                    .http
                    .post(&url)
                    .json(&payload)
                    .send()
                    .await
                    .map_err(|e| Error::Llm(format!("gemini: request failed: {e}")))?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::Llm(format!(
                        "gemini: API error {}: {body}",
                        status.as_u16()
                    )));
                }

                let parsed: GeminiResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Llm(format!("gemini: failed to parse response: {e}")))?;

                let content = parsed
                    .candidates
                    .into_iter()
                    .flat_map(|c| c.content.map(|c| c.parts).unwrap_or_default())
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("\n");

                tracing::debug!(model = %req.model, chars = content.len(), "generated content");

                Ok(GenerateResponse { content })
            })
            .await
    }
}
