use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{ChatLog, CodeEvaluation};

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
pub const MAX_HISTORY_LIMIT: i64 = 200;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ChatBody {
    pub message: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChatResponse {
    pub response: String,
    pub model: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ChatHistoryQuery {
    pub limit: Option<i64>,
}

impl ChatHistoryQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChatHistoryResponse {
    pub history: Vec<ChatLog>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct EvaluateBody {
    pub code: Option<String>,
    pub language: Option<String>,
    pub lesson_id: Option<Uuid>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EvaluateResponse {
    pub id: Uuid,
    pub output: String,
    /// Seconds spent waiting for the assistant.
    pub execution_time: f64,
    pub language: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EvaluationsResponse {
    pub evaluations: Vec<CodeEvaluation>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CodeAssistBody {
    pub code: Option<String>,
    pub language: Option<String>,
    /// Only read by the debug endpoint.
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CodeAssistResponse {
    pub kind: String,
    pub output: String,
    pub language: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn history_limit_is_bounded() {
        assert_eq!(ChatHistoryQuery { limit: None }.limit(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(ChatHistoryQuery { limit: Some(0) }.limit(), 1);
        assert_eq!(ChatHistoryQuery { limit: Some(1000) }.limit(), MAX_HISTORY_LIMIT);
    }
}
