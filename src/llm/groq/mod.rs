#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::CorpusError;
use crate::config::GroqConfig;
use crate::llm::{ChatMessage, CompletionModel};

/// Client for Groq's OpenAI-compatible chat-completions API. One request per
/// call; failures propagate to the caller without retries.
#[derive(Debug, Clone)]
pub struct GroqClient {
    base_url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl GroqClient {
    /// Construct a client from configuration. A missing API key is an
    /// initialization failure, surfaced before any chat interaction.
    #[inline]
    pub fn new(config: &GroqConfig) -> Result<Self> {
        if !config.has_api_key() {
            return Err(CorpusError::Config(format!(
                "Groq API key is not configured; set {} or add it to config.toml",
                crate::config::settings::GROQ_API_KEY_ENV
            ))
            .into());
        }

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            agent,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl CompletionModel for GroqClient {
    #[inline]
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        debug!(
            "Requesting chat completion from {} ({} messages)",
            self.model,
            messages.len()
        );

        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let request_json =
            serde_json::to_string(&request).context("Failed to serialize chat request")?;

        let response_text = self
            .agent
            .post(&self.completions_url())
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .context("Chat completion request failed")?;

        let chat_response: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse chat response")?;

        let answer = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("Chat response contained no choices"))?;

        debug!("Received completion ({} chars)", answer.len());
        Ok(answer)
    }
}
