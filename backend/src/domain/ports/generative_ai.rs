//! Port for the generative-AI backend.
//!
//! Prompts are rendered by the domain. Adapters only move text: they send a
//! [`Prompt`] and hand back the model's raw output.
use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by generative-AI adapters.
    pub enum GenerativeAiError {
        /// No API key was configured.
        Unconfigured => "generative AI backend is not configured",
        /// Transport failure, timeout or non-success status.
        Upstream { message: String } => "generative AI request failed: {message}",
        /// Response envelope could not be decoded.
        Decode { message: String } => "generative AI response invalid: {message}",
    }
}

/// Shape the model is asked to answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Free text.
    Text,
    /// A single JSON object.
    Json,
}

/// A rendered prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub format: OutputFormat,
}

impl Prompt {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: OutputFormat::Text,
        }
    }

    pub fn json(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: OutputFormat::Json,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeAi: Send + Sync {
    /// Run one completion and return the model output verbatim.
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerativeAiError>;
}
