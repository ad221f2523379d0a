//! # OpenDev Models
//!
//! Centralized text-generation backend configuration. Every provider here
//! speaks the OpenAI-compatible `/chat/completions` protocol, so one client
//! type serves them all.

use crate::llm::{ChatCompletionsLlm, TextGenerator};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Supported text-generation providers
///
/// - Groq - `GROQ_API_KEY`
/// - OpenAI - `OPENAI_API_KEY`
/// - OpenRouter - `OPENROUTER_API_KEY`
/// - Ollama (local) - no key
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Groq,
    #[serde(rename = "openai")]
    OpenAI,
    OpenRouter,
    Ollama,
}

impl LlmProvider {
    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "Groq",
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::OpenRouter => "OpenRouter",
            LlmProvider::Ollama => "Ollama",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "https://api.groq.com/openai/v1",
            LlmProvider::OpenAI => "https://api.openai.com/v1",
            LlmProvider::OpenRouter => "https://openrouter.ai/api/v1",
            LlmProvider::Ollama => "http://localhost:11434/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "llama-3.3-70b-versatile",
            LlmProvider::OpenAI => "gpt-4o",
            LlmProvider::OpenRouter => "meta-llama/llama-3.3-70b-instruct",
            LlmProvider::Ollama => "llama3.1",
        }
    }

    /// Environment variable holding the API key, if the provider needs one
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Groq => Some("GROQ_API_KEY"),
            LlmProvider::OpenAI => Some("OPENAI_API_KEY"),
            LlmProvider::OpenRouter => Some("OPENROUTER_API_KEY"),
            LlmProvider::Ollama => None,
        }
    }

    pub fn parse(name: &str) -> Option<LlmProvider> {
        match name.trim().to_lowercase().as_str() {
            "groq" => Some(LlmProvider::Groq),
            "openai" => Some(LlmProvider::OpenAI),
            "openrouter" => Some(LlmProvider::OpenRouter),
            "ollama" => Some(LlmProvider::Ollama),
            _ => None,
        }
    }
}

/// Configuration for backend model selection
///
/// ## Example
/// ```rust,ignore
/// use opendev_core::models::{ModelConfig, LlmProvider};
///
/// let config = ModelConfig::with_provider(LlmProvider::OpenAI, "gpt-4o");
/// let llm = config.create_llm()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider to use
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model name (e.g., "llama-3.3-70b-versatile", "gpt-4o")
    pub model: String,
    /// Optional base URL override
    #[serde(default)]
    pub base_url: Option<String>,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Groq,
            model: LlmProvider::Groq.default_model().to_string(),
            base_url: None,
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ModelConfig {
    /// Create a new model config with the default provider (Groq)
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Create config for a specific provider
    pub fn with_provider(provider: LlmProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set base URL (self-hosted or proxy endpoints)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Read `OPENDEV_PROVIDER`, `OPENDEV_MODEL` and `OPENDEV_BASE_URL`,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let provider = std::env::var("OPENDEV_PROVIDER")
            .ok()
            .and_then(|p| LlmProvider::parse(&p))
            .unwrap_or_default();
        let model = std::env::var("OPENDEV_MODEL")
            .unwrap_or_else(|_| provider.default_model().to_string());

        let mut config = Self::with_provider(provider, model);
        if let Ok(url) = std::env::var("OPENDEV_BASE_URL") {
            config = config.with_base_url(url);
        }
        config
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    /// Create a text-generation client for the configured provider.
    /// Fails if the provider's API key is missing from the environment.
    pub fn create_llm(&self) -> anyhow::Result<Arc<dyn TextGenerator>> {
        let api_key = match self.provider.api_key_env() {
            Some(var) => Some(
                std::env::var(var)
                    .with_context(|| format!("{} requires {}", self.provider.display_name(), var))?,
            ),
            None => None,
        };

        let llm = ChatCompletionsLlm::new(
            self.effective_base_url(),
            api_key,
            &self.model,
            self.temperature,
            Duration::from_secs(self.request_timeout_secs),
        )
        .context("Failed to build HTTP client")?;

        Ok(Arc::new(llm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.provider, LlmProvider::Groq);
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_provider_display_names() {
        assert_eq!(LlmProvider::Groq.display_name(), "Groq");
        assert_eq!(LlmProvider::OpenAI.display_name(), "OpenAI");
    }

    #[test]
    fn test_ollama_needs_no_key() {
        assert!(LlmProvider::Ollama.api_key_env().is_none());
        let config = ModelConfig::with_provider(LlmProvider::Ollama, "llama3.1");
        assert!(config.create_llm().is_ok());
    }

    #[test]
    fn test_base_url_override() {
        let config = ModelConfig::new("m").with_base_url("http://proxy:9000/v1");
        assert_eq!(config.effective_base_url(), "http://proxy:9000/v1");
        assert_eq!(
            ModelConfig::default().effective_base_url(),
            "https://api.groq.com/openai/v1"
        );
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(LlmProvider::parse("OpenAI"), Some(LlmProvider::OpenAI));
        assert_eq!(LlmProvider::parse("nope"), None);
    }

    #[test]
    fn test_model_config_serialization() {
        let config = ModelConfig::with_provider(LlmProvider::OpenAI, "gpt-4o");
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("openai"));
        assert!(json.contains("gpt-4o"));

        let parsed: ModelConfig =
            serde_json::from_str(r#"{"provider":"ollama","model":"llama3.1"}"#).unwrap();
        assert_eq!(parsed.request_timeout_secs, 60);
    }
}
