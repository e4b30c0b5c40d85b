use std::time::Duration;

use thiserror::Error;

pub type AiResult<T> = std::result::Result<T, AiError>;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI provider is not configured")]
    NotConfigured,
    #[error("AI provider unreachable: {0}")]
    Network(String),
    #[error("AI provider timed out after {0:?}")]
    Timeout(Duration),
    #[error("AI provider returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid AI provider response: {0}")]
    InvalidResponse(String),
}

impl AiError {
    pub fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout)
        } else if error.is_decode() {
            Self::InvalidResponse(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}
