//! Scripted provider for tests and offline runs.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use kgb_core::traits::{GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage};

use crate::error::ProviderError;

enum Reply {
    Fixed(String),
    Fail(u16, String),
}

/// A provider that answers every request with the same scripted reply.
pub struct MockProvider {
    reply: Reply,
    call_count: AtomicU32,
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Always answer with `content`.
    pub fn with_fixed_response(content: &str) -> Self {
        Self::from_reply(Reply::Fixed(content.to_string()))
    }

    /// Always fail with an API error of the given status.
    pub fn failing(status: u16, message: &str) -> Self {
        Self::from_reply(Reply::Fail(status, message.to_string()))
    }

    fn from_reply(reply: Reply) -> Self {
        Self {
            reply,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        match &self.reply {
            Reply::Fixed(content) => {
                // Rough estimate, four characters per token.
                let prompt_tokens = (request.prompt.len() / 4) as u32;
                let completion_tokens = (content.len() / 4) as u32;
                Ok(GenerateResponse {
                    content: content.clone(),
                    model: request.model.clone(),
                    token_usage: TokenUsage {
                        prompt_tokens,
                        completion_tokens,
                        total_tokens: prompt_tokens + completion_tokens,
                    },
                    latency_ms: 1,
                })
            }
            Reply::Fail(status, message) => Err(ProviderError::ApiError {
                status: *status,
                message: message.clone(),
            }
            .into()),
        }
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
        }]
    }
}
