//! Generative-AI outbound adapters.

mod dto;
mod gemini_client;

pub use gemini_client::{GeminiClient, GeminiConfig, UnconfiguredGenerativeAi};
