use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use uuid::Uuid;

use crate::{
    model::{DatabaseResult, ModelManager, ResourceType, ResourceTyped},
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Quiz {
    id: Uuid,
    lesson_id: Uuid,
    title: String,
    #[schema(value_type = Object)]
    questions: Json<serde_json::Value>,
    total_points: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuizCreate {
    pub lesson_id: Uuid,
    pub title: String,
    pub questions: serde_json::Value,
    pub total_points: i32,
}

impl ResourceTyped for Quiz {
    fn get_resource_type() -> ResourceType {
        ResourceType::Quiz
    }
}

impl Quiz {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn total_points(&self) -> i32 {
        self.total_points
    }

    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreate,
    ) -> DatabaseResult<Self> {
        let quiz = Quiz {
            id: Uuid::new_v4(),
            lesson_id: data.lesson_id,
            title: data.title,
            questions: Json(data.questions),
            total_points: data.total_points,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO quizzes (id, lesson_id, title, questions, total_points, created_at) VALUES (?,?,?,?,?,?)")
            .bind(quiz.id)
            .bind(quiz.lesson_id)
            .bind(&quiz.title)
            .bind(&quiz.questions)
            .bind(quiz.total_points)
            .bind(quiz.created_at)
            .execute(mm.executor())
            .await?;

        Ok(quiz)
    }

    pub async fn find_by_lesson(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        lesson_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM quizzes WHERE lesson_id = ?")
            .bind(lesson_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }
}
