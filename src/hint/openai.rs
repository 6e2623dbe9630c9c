use super::*;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};

const HINT_SYSTEM_PROMPT: &str = "You are assisting players in a drawing and guessing game. \
    Based on the drawing and the guesses so far, provide a single helpful hint to guide the \
    players. The hint should not directly reveal the answer but nudge them in the right \
    direction. Make the hint creative and keep it to one short sentence.";

/// OpenAI provider implementation
pub struct OpenAiHintProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiHintProvider {
    /// Create a new OpenAI provider with the given API key and model
    pub fn new(api_key: String, model: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);

        Self { client, model }
    }
}

#[async_trait]
impl HintProvider for OpenAiHintProvider {
    async fn generate(&self, request: HintRequest) -> HintResult<String> {
        let user_content = format!(
            "The current drawing is described as: {}.\nRecent guesses include: {}.\n\nHint:",
            request.drawing_description,
            request.recent_guesses.join(", ")
        );

        let mut req_builder = CreateChatCompletionRequestArgs::default();
        req_builder.model(&self.model).messages([
            ChatCompletionRequestSystemMessageArgs::default()
                .content(HINT_SYSTEM_PROMPT)
                .build()
                .map_err(|e| HintError::ApiError(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_content)
                .build()
                .map_err(|e| HintError::ApiError(e.to_string()))?
                .into(),
        ]);

        if let Some(max_tokens) = request.max_tokens {
            req_builder.max_tokens(max_tokens);
        }

        let chat_request = req_builder
            .build()
            .map_err(|e| HintError::ApiError(e.to_string()))?;

        let response =
            tokio::time::timeout(request.timeout, self.client.chat().create(chat_request))
                .await
                .map_err(|_| HintError::Timeout(request.timeout))?
                .map_err(|e| HintError::ApiError(e.to_string()))?;

        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| HintError::ParseError("No content in response".to_string()))?;

        Ok(text.trim().to_string())
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    #[ignore] // Only run with actual API key
    async fn test_openai_hint() {
        let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
        let provider = OpenAiHintProvider::new(api_key, "gpt-4o-mini".to_string());

        let request = HintRequest {
            drawing_description: "A player's drawing".to_string(),
            recent_guesses: vec!["a planet?".to_string(), "a cookie?".to_string()],
            max_tokens: Some(100),
            timeout: Duration::from_secs(30),
        };

        let hint = provider.generate(request).await.unwrap();
        assert!(!hint.is_empty());
        println!("Hint: {}", hint);
    }
}
