use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::{
    model::{DatabaseResult, ModelManager, ResourceType, ResourceTyped},
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct ChatLog {
    id: Uuid,
    user_id: Uuid,
    message: String,
    response: String,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for ChatLog {
    fn get_resource_type() -> ResourceType {
        ResourceType::ChatLog
    }
}

impl ChatLog {
    pub async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        message: String,
        response: String,
    ) -> DatabaseResult<Self> {
        let log = ChatLog {
            id: Uuid::new_v4(),
            user_id: actor.user_id(),
            message,
            response,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO chat_logs (id, user_id, message, response, created_at) VALUES (?,?,?,?,?)")
            .bind(log.id)
            .bind(log.user_id)
            .bind(&log.message)
            .bind(&log.response)
            .bind(log.created_at)
            .execute(mm.executor())
            .await?;

        Ok(log)
    }

    /// Newest first.
    pub async fn history(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM chat_logs WHERE user_id = ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(actor.user_id())
        .bind(limit)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}
