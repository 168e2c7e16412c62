//! Reqwest-backed Gemini adapter for the generative-AI port.
//!
//! The adapter owns transport only: it wraps the prompt text in a
//! `generateContent` request, asks for a JSON MIME type when the prompt wants
//! JSON, and returns the first candidate's text untouched.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{ContentDto, GenerateRequestDto, GenerateResponseDto, GenerationConfigDto, PartDto};
use crate::domain::ports::{GenerativeAi, GenerativeAiError, OutputFormat, Prompt};
use crate::outbound::http_preview::status_message;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Connection settings for [`GeminiClient`].
pub struct GeminiConfig {
    /// Base URL, e.g. `https://generativelanguage.googleapis.com/`.
    pub endpoint: Url,
    pub model: String,
    pub api_key: Zeroizing<String>,
    pub timeout: Duration,
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    client: Client,
    url: Url,
    api_key: Zeroizing<String>,
}

impl GeminiClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GenerativeAiError::Upstream`] when the model path does not
    /// form a valid URL or the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, GenerativeAiError> {
        let url = generate_url(&config.endpoint, &config.model)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| GenerativeAiError::upstream(err.to_string()))?;
        Ok(Self {
            client,
            url,
            api_key: config.api_key,
        })
    }
}

fn generate_url(endpoint: &Url, model: &str) -> Result<Url, GenerativeAiError> {
    let model = model.trim();
    if model.is_empty() || model.contains('/') {
        return Err(GenerativeAiError::upstream(format!(
            "invalid Gemini model name '{model}'"
        )));
    }
    endpoint
        .join(&format!("v1beta/models/{model}:generateContent"))
        .map_err(|err| GenerativeAiError::upstream(format!("invalid Gemini endpoint: {err}")))
}

fn request_body(prompt: &Prompt) -> GenerateRequestDto<'_> {
    GenerateRequestDto {
        contents: [ContentDto {
            parts: [PartDto {
                text: prompt.text.as_str(),
            }],
        }],
        generation_config: match prompt.format {
            OutputFormat::Json => Some(GenerationConfigDto {
                response_mime_type: "application/json",
            }),
            OutputFormat::Text => None,
        },
    }
}

fn parse_text(body: &[u8]) -> Result<String, GenerativeAiError> {
    let decoded: GenerateResponseDto = serde_json::from_slice(body)
        .map_err(|err| GenerativeAiError::decode(format!("invalid Gemini payload: {err}")))?;
    decoded
        .into_text()
        .ok_or_else(|| GenerativeAiError::decode("response carried no candidates"))
}

#[async_trait]
impl GenerativeAi for GeminiClient {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerativeAiError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request_body(prompt))
            .send()
            .await
            .map_err(|err| GenerativeAiError::upstream(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| GenerativeAiError::upstream(err.to_string()))?;
        if !status.is_success() {
            return Err(GenerativeAiError::upstream(status_message(status, &body)));
        }
        debug!(bytes = body.len(), "gemini response received");
        parse_text(&body)
    }
}

/// Stand-in used when no Gemini key is configured; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredGenerativeAi;

#[async_trait]
impl GenerativeAi for UnconfiguredGenerativeAi {
    async fn generate(&self, _prompt: &Prompt) -> Result<String, GenerativeAiError> {
        Err(GenerativeAiError::unconfigured())
    }
}
