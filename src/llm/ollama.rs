use crate::llm::client::{LanguageModel, context_instruction};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, request::ChatMessageRequest},
    models::ModelOptions,
};

pub struct OllamaClient {
    client: Ollama,
    model: String,
    temperature: f32,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: String, temperature: f32) -> Result<Self> {
        let (scheme, rest) = base_url
            .split_once("://")
            .unwrap_or(("http", base_url));
        let rest = rest.trim_end_matches('/');
        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse().map_err(|_| {
                    AppError::Config(format!("Invalid Ollama port in base_url: {}", base_url))
                })?;
                (host, port)
            }
            None => (rest, 11434),
        };

        let client = Ollama::new(format!("{}://{}", scheme, host), port);

        Ok(Self {
            client,
            model,
            temperature,
        })
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn complete(&self, context: &str, prompt: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = context_instruction(context) {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt.to_string()));

        let request = ChatMessageRequest::new(self.model.clone(), messages)
            .options(ModelOptions::default().temperature(self.temperature));

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| AppError::transient(format!("Ollama error: {}", e)))?;

        Ok(response.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_port_rejected() {
        let result = OllamaClient::new("http://localhost:abc", "llama3.2".to_string(), 0.0);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_default_port() {
        let client = OllamaClient::new("http://localhost", "llama3.2".to_string(), 0.0).unwrap();
        assert_eq!(client.model_name(), "llama3.2");
    }
}
