use std::sync::Arc;

use crate::ai::{AiProvider, AiRequest, AiResponse, AiResult};

pub const DEFAULT_LANGUAGE: &str = "python";

/// What the learner asked the assistant to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistKind {
    Chat,
    Evaluate,
    Explain,
    Optimize,
    Debug,
}

impl AssistKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Evaluate => "evaluate",
            Self::Explain => "explain",
            Self::Optimize => "optimize",
            Self::Debug => "debug",
        }
    }

    fn system_prompt(&self, language: &str) -> String {
        match self {
            Self::Chat => String::from(
                "You are a patient programming tutor on a learning platform. \
                 Answer clearly and prefer short examples.",
            ),
            Self::Evaluate => format!(
                "You review {language} code submitted by a learner. Describe what it does, \
                 point out errors or bugs, and state what output it would produce."
            ),
            Self::Explain => format!(
                "Explain the following {language} code step by step for a beginner."
            ),
            Self::Optimize => format!(
                "Suggest an improved version of the following {language} code and briefly \
                 explain each change."
            ),
            Self::Debug => format!(
                "Help the learner debug the following {language} code. Identify the cause of \
                 the reported error and propose a fix."
            ),
        }
    }
}

/// Turns learner requests into provider calls.
#[derive(Clone)]
pub struct Assistant {
    provider: Arc<dyn AiProvider>,
    max_tokens: u32,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("provider", &self.provider.name())
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Assistant {
    pub fn new(provider: Arc<dyn AiProvider>, max_tokens: u32) -> Self {
        Self {
            provider,
            max_tokens,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn chat(&self, message: &str) -> AiResult<AiResponse> {
        self.ask(AssistKind::Chat, DEFAULT_LANGUAGE, message.to_string())
            .await
    }

    /// Code tasks. `error_message` is only used by [`AssistKind::Debug`].
    pub async fn code(
        &self,
        kind: AssistKind,
        code: &str,
        language: &str,
        error_message: Option<&str>,
    ) -> AiResult<AiResponse> {
        let prompt = match (kind, error_message) {
            (AssistKind::Debug, Some(error)) if !error.trim().is_empty() => {
                format!("Error message:\n{error}\n\nCode:\n```{language}\n{code}\n```")
            }
            _ => format!("```{language}\n{code}\n```"),
        };
        self.ask(kind, language, prompt).await
    }

    #[tracing::instrument(skip(self, prompt), fields(provider = %self.provider.name(), kind = kind.as_str()))]
    async fn ask(&self, kind: AssistKind, language: &str, prompt: String) -> AiResult<AiResponse> {
        let request = AiRequest {
            system: Some(kind.system_prompt(language)),
            prompt,
            max_tokens: self.max_tokens,
            temperature: 0.2,
        };

        let result = self.provider.complete(request).await;
        match &result {
            Ok(response) => tracing::debug!(elapsed = ?response.elapsed, "AI provider answered"),
            Err(e) => tracing::warn!("AI provider failed: {e}"),
        }
        result
    }
}
