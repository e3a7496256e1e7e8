use async_trait::async_trait;

use crate::error::LlmError;

pub mod remote;

/// Core trait for chat-completion providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Single request/response completion, no retry
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Condense `user_prompt` under the instructions in `system_prompt`,
    /// with the provider's default limits.
    async fn summarize(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let response = self
            .generate(LlmRequest {
                system_prompt: Some(system_prompt.to_string()),
                prompt: user_prompt.to_string(),
                max_tokens: None,
                temperature: None,
                timeout_seconds: None,
            })
            .await?;
        Ok(response.content.trim().to_string())
    }
}

/// Request structure for LLM generation
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system_prompt: Option<String>,
    pub prompt: String,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

/// Response from LLM generation
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub usage: UsageMetadata,
}

/// Token usage metadata
#[derive(Debug, Clone, Default)]
pub struct UsageMetadata {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}
