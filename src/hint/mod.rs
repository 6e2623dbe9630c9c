//! Hint service boundary.
//!
//! Hints come from an external text-generation collaborator. The rest of the
//! server only ever sees a plain string: with no guesses yet the provider is
//! not invoked at all, and any provider failure degrades to a fixed fallback
//! line. Hint failures never propagate.

mod ollama;
mod openai;

use async_trait::async_trait;
use std::time::Duration;

pub use ollama::OllamaHintProvider;
pub use openai::OpenAiHintProvider;

/// Result type for hint operations
pub type HintResult<T> = Result<T, HintError>;

/// Errors that can occur while talking to a hint provider
#[derive(Debug, thiserror::Error)]
pub enum HintError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Response parsing failed: {0}")]
    ParseError(String),
}

/// Returned when players ask for a hint before anyone has guessed.
pub const NO_GUESSES_HINT: &str = "Make a few guesses first and then I can give you a hint!";

/// Returned whenever the external text service fails for any reason.
pub const FALLBACK_HINT: &str = "Sorry, I couldn't think of a hint right now. Try guessing again!";

/// Request for a single hint
#[derive(Debug, Clone)]
pub struct HintRequest {
    /// A short description of the current drawing
    pub drawing_description: String,
    /// The most recent guess texts, oldest first
    pub recent_guesses: Vec<String>,
    /// Maximum response length in tokens (provider-dependent)
    pub max_tokens: Option<u32>,
    /// Timeout for the request
    pub timeout: Duration,
}

/// Trait that all hint providers must implement
#[async_trait]
pub trait HintProvider: Send + Sync {
    /// Generate a single hint for the given drawing and guesses
    async fn generate(&self, request: HintRequest) -> HintResult<String>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Tries the configured providers in order and degrades to fixed strings.
pub struct HintManager {
    pub providers: Vec<Box<dyn HintProvider>>,
    timeout: Duration,
    max_tokens: u32,
}

impl HintManager {
    pub fn new(providers: Vec<Box<dyn HintProvider>>, timeout: Duration, max_tokens: u32) -> Self {
        Self {
            providers,
            timeout,
            max_tokens,
        }
    }

    /// Produce a hint string. Never fails: with no guesses yet the external
    /// service is not invoked at all, and every provider failing falls back
    /// to a canned line.
    pub async fn hint_for(&self, drawing_description: &str, recent_guesses: &[String]) -> String {
        if recent_guesses.is_empty() {
            return NO_GUESSES_HINT.to_string();
        }

        let request = HintRequest {
            drawing_description: drawing_description.to_string(),
            recent_guesses: recent_guesses.to_vec(),
            max_tokens: Some(self.max_tokens),
            timeout: self.timeout,
        };

        for provider in &self.providers {
            match provider.generate(request.clone()).await {
                Ok(text) if !text.trim().is_empty() => return text.trim().to_string(),
                Ok(_) => {
                    tracing::warn!("Hint provider {} returned an empty hint", provider.name());
                }
                Err(e) => {
                    tracing::warn!("Hint provider {} failed: {}", provider.name(), e);
                }
            }
        }

        FALLBACK_HINT.to_string()
    }
}

/// Configuration for hint providers
#[derive(Debug, Clone)]
pub struct HintConfig {
    /// OpenAI API key
    pub openai_api_key: Option<String>,
    /// OpenAI model to use
    pub openai_model: String,
    /// Ollama base URL
    pub ollama_base_url: Option<String>,
    /// Ollama model to use
    pub ollama_model: String,
    /// Default timeout for hint requests
    pub default_timeout: Duration,
    /// Default max tokens for responses
    pub default_max_tokens: u32,
}

impl Default for HintConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            ollama_base_url: Some("http://localhost:11434".to_string()),
            ollama_model: "llama3.2".to_string(),
            default_timeout: Duration::from_secs(30),
            default_max_tokens: 100,
        }
    }
}

impl HintConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok().and_then(|key| {
            let trimmed = key.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });

        let openai_model = std::env::var("OPENAI_MODEL")
            .ok()
            .and_then(|model| {
                let trimmed = model.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| "gpt-4o-mini".to_string());

        let ollama_base_url = match std::env::var("OLLAMA_BASE_URL") {
            Ok(url) => {
                let trimmed = url.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Err(_) => Some("http://localhost:11434".to_string()),
        };

        let ollama_model = std::env::var("OLLAMA_MODEL")
            .ok()
            .and_then(|model| {
                let trimmed = model.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| "llama3.2".to_string());

        Self {
            openai_api_key,
            openai_model,
            ollama_base_url,
            ollama_model,
            default_timeout: std::env::var("HINT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(30)),
            default_max_tokens: std::env::var("HINT_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
        }
    }

    /// Build a HintManager with all configured providers
    pub fn build_manager(&self) -> HintResult<HintManager> {
        let mut providers: Vec<Box<dyn HintProvider>> = Vec::new();

        if let Some(api_key) = &self.openai_api_key {
            providers.push(Box::new(OpenAiHintProvider::new(
                api_key.clone(),
                self.openai_model.clone(),
            )));
        }

        if let Some(base_url) = &self.ollama_base_url {
            providers.push(Box::new(OllamaHintProvider::new(
                base_url.clone(),
                self.ollama_model.clone(),
            )));
        }

        if providers.is_empty() {
            return Err(HintError::ConfigError(
                "No hint providers configured. Set OPENAI_API_KEY or OLLAMA_BASE_URL".to_string(),
            ));
        }

        Ok(HintManager::new(
            providers,
            self.default_timeout,
            self.default_max_tokens,
        ))
    }
}
