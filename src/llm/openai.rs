use crate::llm::client::{LanguageModel, context_instruction};
use crate::types::{AppError, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIClient {
    pub fn new(api_key: String, api_base: String, model: String, temperature: f32) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        Self {
            client: Client::with_config(config),
            model,
            temperature,
        }
    }
}

fn map_api_error(err: OpenAIError) -> AppError {
    let message = format!("OpenAI API error: {}", err);
    match err {
        OpenAIError::Reqwest(_) => AppError::transient(message),
        _ => AppError::upstream(message),
    }
}

#[async_trait]
impl LanguageModel for OpenAIClient {
    async fn complete(&self, context: &str, prompt: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = context_instruction(context) {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage::from(system),
            ));
        }
        messages.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage::from(prompt.to_string()),
        ));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(self.temperature)
            .messages(messages)
            .build()
            .map_err(|e| AppError::upstream(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_api_error)?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::upstream("No response from OpenAI"))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
