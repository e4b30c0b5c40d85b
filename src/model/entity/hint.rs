use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::{
    model::{DatabaseResult, ModelManager, ResourceType, ResourceTyped},
    web::AuthenticatedUser,
};

pub const MIN_HINT_LEVEL: i32 = 1;
pub const MAX_HINT_LEVEL: i32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Hint {
    id: Uuid,
    lesson_id: Uuid,
    hint_text: String,
    difficulty_level: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HintCreate {
    pub lesson_id: Uuid,
    pub hint_text: String,
    pub difficulty_level: i32,
}

impl ResourceTyped for Hint {
    fn get_resource_type() -> ResourceType {
        ResourceType::Hint
    }
}

impl Hint {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: HintCreate,
    ) -> DatabaseResult<Self> {
        let hint = Hint {
            id: Uuid::new_v4(),
            lesson_id: data.lesson_id,
            hint_text: data.hint_text,
            difficulty_level: data.difficulty_level,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO hints (id, lesson_id, hint_text, difficulty_level, created_at) VALUES (?,?,?,?,?)")
            .bind(hint.id)
            .bind(hint.lesson_id)
            .bind(&hint.hint_text)
            .bind(hint.difficulty_level)
            .bind(hint.created_at)
            .execute(mm.executor())
            .await?;

        Ok(hint)
    }

    /// Easiest hints first.
    pub async fn all_by_lesson(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        lesson_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM hints WHERE lesson_id = ? ORDER BY difficulty_level ASC, created_at ASC",
        )
        .bind(lesson_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}
