/// LLM Client: the single point of entry for chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the completion service directly.
/// Everything goes through [`CompletionBackend`], so handlers and tests can swap the
/// backend without touching callers.
///
/// One request per call: no timeout, no retry. The caller decides what a failed or
/// malformed completion means.
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Response body (status {status}) is not JSON: {source}")]
    Parse {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// A service that answers a single-turn prompt with a chat-completion envelope
/// (`{choices:[{message:{content}}]}`), returned unvalidated.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Value, LlmError>;
}

/// OpenAI-compatible chat-completion client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl LlmClient {
    pub fn new(api_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_url,
            model,
            api_key,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<Value, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self.client.post(&self.api_url).json(&request_body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            // Error bodies are still envelopes worth surfacing to the caller.
            warn!("Completion API returned {status}");
        }

        let body = response.text().await?;
        let envelope: Value = serde_json::from_str(&body).map_err(|source| LlmError::Parse {
            status: status.as_u16(),
            source,
        })?;

        debug!("Full completion API response: {envelope}");
        Ok(envelope)
    }
}
