use async_trait::async_trait;

use crate::ai::{AiError, AiProvider, AiRequest, AiResponse, AiResult};

/// Stand-in used when no API key is configured. Every call fails.
#[derive(Debug, Default, Clone)]
pub struct DisabledProvider;

#[async_trait]
impl AiProvider for DisabledProvider {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _request: AiRequest) -> AiResult<AiResponse> {
        Err(AiError::NotConfigured)
    }
}
