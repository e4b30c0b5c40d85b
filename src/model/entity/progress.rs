use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::{
    model::{DatabaseResult, ModelManager, ResourceType, ResourceTyped},
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Progress {
    id: Uuid,
    user_id: Uuid,
    lesson_id: Uuid,
    completed: bool,
    completion_percentage: f64,
    time_spent: i64,
    last_accessed: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ProgressUpsert {
    pub lesson_id: Uuid,
    pub completed: bool,
    pub completion_percentage: f64,
    pub time_spent: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, utoipa::ToSchema)]
pub struct ProgressStats {
    pub total_progress_records: i64,
    pub completed_lessons: i64,
    pub avg_completion_percentage: Option<f64>,
}

impl ResourceTyped for Progress {
    fn get_resource_type() -> ResourceType {
        ResourceType::Progress
    }
}

impl Progress {
    /// Creates or replaces the actor's record for the lesson.
    pub async fn upsert(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: ProgressUpsert,
    ) -> DatabaseResult<Self> {
        let now = Utc::now();
        let result = sqlx::query_as(
            r#"
            INSERT INTO progress
                (id, user_id, lesson_id, completed, completion_percentage, time_spent, last_accessed, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, lesson_id) DO UPDATE SET
                completed = excluded.completed,
                completion_percentage = excluded.completion_percentage,
                time_spent = excluded.time_spent,
                last_accessed = excluded.last_accessed
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor.user_id())
        .bind(data.lesson_id)
        .bind(data.completed)
        .bind(data.completion_percentage)
        .bind(data.time_spent)
        .bind(now)
        .bind(now)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }

    pub async fn list_for_actor(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM progress WHERE user_id = ? ORDER BY last_accessed DESC")
                .bind(actor.user_id())
                .fetch_all(mm.executor())
                .await?;
        Ok(result)
    }

    pub async fn stats(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<ProgressStats> {
        let result = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total_progress_records,
                COUNT(CASE WHEN completed THEN 1 END) AS completed_lessons,
                AVG(completion_percentage) AS avg_completion_percentage
            FROM progress
            "#,
        )
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}
