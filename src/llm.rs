//! Chat completion clients.
//!
//! [`ChatClient`] is the seam to the external completion service: an
//! ordered list of messages in, an ordered list of response messages out,
//! bounded by a response-round limit. Provider, model id and credential are
//! explicit construction inputs; nothing here reads ambient state.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::{AsmDocError, Result};

/// Default Anthropic model
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
/// Default OpenAI model
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Unified completion-service interface.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends the ordered message list and returns the service's response
    /// messages in order, requesting at most `max_rounds` of them.
    ///
    /// Failures are returned as-is; the client does not retry.
    async fn complete(&self, messages: &[ChatMessage], max_rounds: usize)
        -> Result<Vec<ChatMessage>>;

    /// Model name for logging
    fn model_name(&self) -> &str;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}

/// Completion-service provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmBackend {
    /// Anthropic Claude (default)
    #[default]
    Anthropic,
    /// OpenAI GPT
    OpenAi,
}

impl LlmBackend {
    pub fn name(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "Anthropic",
            LlmBackend::OpenAi => "OpenAI",
        }
    }
}

/// Error type for parsing [`LlmBackend`]
#[derive(Debug)]
pub struct ParseBackendError(String);

impl std::fmt::Display for ParseBackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseBackendError {}

impl FromStr for LlmBackend {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(LlmBackend::Anthropic),
            "openai" | "gpt" => Ok(LlmBackend::OpenAi),
            other => Err(ParseBackendError(format!(
                "Unknown backend '{other}'. Valid values: anthropic, claude, openai, gpt"
            ))),
        }
    }
}

impl std::fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Builds the configured provider's client.
pub fn create_chat_client(config: &AppConfig) -> Arc<dyn ChatClient> {
    match config.backend {
        LlmBackend::Anthropic => Arc::new(AnthropicChatClient::new(
            config.api_key.clone(),
            config.model.as_deref(),
        )),
        LlmBackend::OpenAi => Arc::new(OpenAiChatClient::new(
            config.api_key.clone(),
            config.model.as_deref(),
        )),
    }
}

/// Anthropic Claude API client
#[derive(Clone)]
pub struct AnthropicChatClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
}

impl AnthropicChatClient {
    pub fn new(api_key: String, model: Option<&str>) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            model: model.unwrap_or(DEFAULT_ANTHROPIC_MODEL).to_string(),
        }
    }
}

#[async_trait]
impl ChatClient for AnthropicChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_rounds: usize,
    ) -> Result<Vec<ChatMessage>> {
        // Anthropic takes system text out of band.
        let system = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let turns: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                serde_json::json!({
                    "role": if m.role == Role::Assistant { "assistant" } else { "user" },
                    "content": m.content,
                })
            })
            .collect();

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "model": &self.model,
                "max_tokens": 4096,
                "system": system,
                "messages": turns,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AsmDocError::Completion(format!(
                "Anthropic API error {status}: {body}"
            )));
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            text: Option<String>,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            content: Vec<ContentBlock>,
        }

        let api_response: ApiResponse = response.json().await?;
        let mut replies: Vec<ChatMessage> = api_response
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .map(ChatMessage::assistant)
            .collect();
        replies.truncate(max_rounds.max(1));

        if replies.is_empty() {
            return Err(AsmDocError::Completion("Empty response from Anthropic".into()));
        }
        Ok(replies)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "Anthropic"
    }
}

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAiChatClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(api_key: String, model: Option<&str>) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            model: model.unwrap_or(DEFAULT_OPENAI_MODEL).to_string(),
        }
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_rounds: usize,
    ) -> Result<Vec<ChatMessage>> {
        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&serde_json::json!({
                "model": &self.model,
                "messages": messages,
                "n": max_rounds.max(1),
                "temperature": 0.1,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AsmDocError::Completion(format!(
                "OpenAI API error {status}: {body}"
            )));
        }

        #[derive(Deserialize)]
        struct Message {
            content: String,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            choices: Vec<Choice>,
        }

        let api_response: ApiResponse = response.json().await?;
        if api_response.choices.is_empty() {
            return Err(AsmDocError::Completion("OpenAI returned no choices".into()));
        }
        Ok(api_response
            .choices
            .into_iter()
            .map(|choice| ChatMessage::assistant(choice.message.content))
            .collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!(
            "anthropic".parse::<LlmBackend>().unwrap(),
            LlmBackend::Anthropic
        );
        assert_eq!("claude".parse::<LlmBackend>().unwrap(), LlmBackend::Anthropic);
        assert_eq!("ANTHROPIC".parse::<LlmBackend>().unwrap(), LlmBackend::Anthropic);
        assert_eq!("openai".parse::<LlmBackend>().unwrap(), LlmBackend::OpenAi);
        assert_eq!("gpt".parse::<LlmBackend>().unwrap(), LlmBackend::OpenAi);
        assert!("invalid".parse::<LlmBackend>().is_err());
    }

    #[test]
    fn test_backend_default() {
        assert_eq!(LlmBackend::default(), LlmBackend::Anthropic);
    }

    #[test]
    fn test_client_model_defaults() {
        let anthropic = AnthropicChatClient::new("test-key".into(), None);
        assert_eq!(anthropic.model_name(), DEFAULT_ANTHROPIC_MODEL);
        assert_eq!(anthropic.provider_name(), "Anthropic");

        let openai = OpenAiChatClient::new("test-key".into(), Some("gpt-4o-mini"));
        assert_eq!(openai.model_name(), "gpt-4o-mini");
        assert_eq!(openai.provider_name(), "OpenAI");
    }

    #[test]
    fn test_message_wire_shape() {
        let message = ChatMessage::system("instructions");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "system");
        assert_eq!(value["content"], "instructions");
    }
}
