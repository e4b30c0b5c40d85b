//! AI assistant proxy: forwards learner chat and code to an external model.

use std::sync::Arc;

mod assistant;
pub use assistant::{AssistKind, Assistant, DEFAULT_LANGUAGE};

mod disabled;
pub use disabled::DisabledProvider;

mod error;
pub use error::{AiError, AiResult};

mod openai;
pub use openai::OpenAiCompatibleProvider;

mod provider;
pub use provider::{AiProvider, AiRequest, AiResponse};

use crate::config;

/// Picks the provider for the configured API key, falling back to [`DisabledProvider`].
pub fn provider_from_config(ai: &config::Ai) -> AiResult<Arc<dyn AiProvider>> {
    match ai.api_key() {
        Some(key) => {
            tracing::info!("AI provider: {} ({})", ai.base_url(), ai.model());
            Ok(Arc::new(OpenAiCompatibleProvider::from_config(ai, key)?))
        }
        None => {
            tracing::warn!("AI_API_KEY is not set, AI endpoints will answer 502");
            Ok(Arc::new(DisabledProvider))
        }
    }
}
