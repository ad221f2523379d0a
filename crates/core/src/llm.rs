//! # Text Generation
//!
//! The collaborator every role agent calls: a system prompt plus ordered
//! history in, one completion out. Retry policy, if any, belongs to the
//! implementation, never to the workflow engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Role of a history turn sent to the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One element of the conversation history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("missing API key: set {0}")]
    MissingApiKey(&'static str),

    #[error("request to text-generation backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend returned an empty completion")]
    EmptyCompletion,

    #[error("no scripted reply for prompt starting with {0:?}")]
    ScriptExhausted(String),
}

/// A request/response text-generation backend. Fallible and slow.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn invoke(&self, system_prompt: &str, history: &[ChatTurn]) -> Result<String, LlmError>;
}

// ============================================================================
// OpenAI-compatible HTTP client
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: ChatRole,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for any `/chat/completions` endpoint (Groq, OpenAI, OpenRouter, Ollama)
pub struct ChatCompletionsLlm {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl ChatCompletionsLlm {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            temperature,
        })
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsLlm {
    async fn invoke(&self, system_prompt: &str, history: &[ChatTurn]) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(WireMessage {
            role: ChatRole::System,
            content: system_prompt,
        });
        messages.extend(history.iter().map(|turn| WireMessage {
            role: turn.role,
            content: &turn.content,
        }));

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            stream: false,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(model = %self.model, turns = history.len(), "Invoking text-generation backend");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyCompletion)
    }
}

// ============================================================================
// Scripted backend (tests and offline mode)
// ============================================================================

#[derive(Default)]
struct Script {
    replies: VecDeque<String>,
    last: Option<String>,
    repeat_last: bool,
}

/// Deterministic in-process backend. Replies are keyed by system prompt.
#[derive(Default)]
pub struct ScriptedLlm {
    scripts: Mutex<HashMap<String, Script>>,
    fallback: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for the agent using `system_prompt`
    pub fn on(self, system_prompt: &str, replies: &[&str]) -> Self {
        self.script(system_prompt, replies, false)
    }

    /// Like `on`, but the final reply repeats forever once the queue drains
    pub fn always(self, system_prompt: &str, replies: &[&str]) -> Self {
        self.script(system_prompt, replies, true)
    }

    /// Reply used for any prompt without a script
    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(reply.into());
        self
    }

    fn script(self, system_prompt: &str, replies: &[&str], repeat_last: bool) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            let entry = scripts.entry(system_prompt.to_string()).or_default();
            entry.replies.extend(replies.iter().map(|r| r.to_string()));
            entry.repeat_last = repeat_last;
        }
        self
    }

    /// Number of `invoke` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedLlm {
    async fn invoke(&self, system_prompt: &str, _history: &[ChatTurn]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let exhausted = || LlmError::ScriptExhausted(system_prompt.chars().take(40).collect());

        let mut scripts = self.scripts.lock().map_err(|_| exhausted())?;
        if let Some(script) = scripts.get_mut(system_prompt) {
            if let Some(reply) = script.replies.pop_front() {
                script.last = Some(reply.clone());
                return Ok(reply);
            }
            if script.repeat_last {
                if let Some(last) = &script.last {
                    return Ok(last.clone());
                }
            }
        }

        self.fallback.clone().ok_or_else(exhausted)
    }
}
