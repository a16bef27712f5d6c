use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm::error::LlmError;
use crate::llm::ChatBackend;

pub const DEFAULT_HOST: &str = "http://ollama:11434";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub host: String,
    pub temperature: f64,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Blocking client for the Ollama `/api/chat` endpoint
pub struct OllamaBackend {
    config: OllamaConfig,
    client: reqwest::blocking::Client,
}

impl OllamaBackend {
    pub fn new(config: OllamaConfig) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::InvalidRequest(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// `OLLAMA_HOST` is often a bare `host:port`; default to plain http then
    fn chat_url(&self) -> String {
        let host = self.config.host.trim().trim_end_matches('/');
        if host.contains("://") {
            format!("{}/api/chat", host)
        } else {
            format!("http://{}/api/chat", host)
        }
    }
}

impl ChatBackend for OllamaBackend {
    fn chat(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let payload = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: ChatOptions {
                temperature: self.config.temperature,
            },
        };

        debug!(model, url = %self.chat_url(), "Sending chat request");
        let response = self.client.post(self.chat_url()).json(&payload).send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let body: ChatResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        Ok(body.message.content)
    }
}
