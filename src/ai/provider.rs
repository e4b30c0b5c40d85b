use std::time::Duration;

use async_trait::async_trait;

use crate::ai::AiResult;

/// Backend that turns a prompt into a completion.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Provider name, used in logs.
    fn name(&self) -> &str;

    async fn complete(&self, request: AiRequest) -> AiResult<AiResponse>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiRequest {
    /// Instructions for the model
    pub system: Option<String>,
    /// The learner's message or code
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct AiResponse {
    pub text: String,
    pub model: String,
    /// Wall time spent waiting for the provider
    pub elapsed: Duration,
}
