use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama provider implementation
pub struct OllamaHintProvider {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaHintProvider {
    /// Create a new Ollama provider with the given base URL and model
    pub fn new(base_url: String, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        Self {
            base_url,
            model,
            client,
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    #[allow(dead_code)] // Part of Ollama API response format
    done: bool,
}

#[async_trait]
impl HintProvider for OllamaHintProvider {
    async fn generate(&self, request: HintRequest) -> HintResult<String> {
        let prompt = format!(
            "You are assisting players in a drawing and guessing game. \
             The current drawing is described as: {}. Recent guesses include: {}. \
             Provide a single creative hint that nudges the players toward the answer \
             without revealing it, in one short sentence.\n\nHint:",
            request.drawing_description,
            request.recent_guesses.join(", ")
        );

        let ollama_request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            options: request.max_tokens.map(|num_predict| OllamaOptions {
                num_predict: Some(num_predict),
            }),
        };

        let url = format!("{}/api/generate", self.base_url);

        let response = tokio::time::timeout(
            request.timeout,
            self.client.post(&url).json(&ollama_request).send(),
        )
        .await
        .map_err(|_| HintError::Timeout(request.timeout))?
        .map_err(|e| HintError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(HintError::ApiError(format!(
                "Ollama API returned status: {}",
                response.status()
            )));
        }

        let ollama_response: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| HintError::ParseError(e.to_string()))?;

        Ok(ollama_response.response.trim().to_string())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
