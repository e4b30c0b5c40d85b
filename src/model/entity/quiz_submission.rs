use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use uuid::Uuid;

use crate::{
    model::{DatabaseResult, ModelManager, ResourceType, ResourceTyped},
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuizSubmission {
    id: Uuid,
    user_id: Uuid,
    quiz_id: Uuid,
    lesson_id: Uuid,
    #[schema(value_type = Object)]
    answers: Json<serde_json::Value>,
    score: f64,
    max_score: f64,
    submitted_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct QuizSubmissionCreate {
    pub quiz_id: Uuid,
    pub lesson_id: Uuid,
    pub answers: serde_json::Value,
    pub score: f64,
    pub max_score: f64,
}

impl ResourceTyped for QuizSubmission {
    fn get_resource_type() -> ResourceType {
        ResourceType::QuizSubmission
    }
}

impl QuizSubmission {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    /// Stores a submission owned by `actor`.
    pub async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: QuizSubmissionCreate,
    ) -> DatabaseResult<Self> {
        let submission = QuizSubmission {
            id: Uuid::new_v4(),
            user_id: actor.user_id(),
            quiz_id: data.quiz_id,
            lesson_id: data.lesson_id,
            answers: Json(data.answers),
            score: data.score,
            max_score: data.max_score,
            submitted_at: Utc::now(),
        };

        sqlx::query("INSERT INTO quiz_submissions (id, user_id, quiz_id, lesson_id, answers, score, max_score, submitted_at) VALUES (?,?,?,?,?,?,?,?)")
            .bind(submission.id)
            .bind(submission.user_id)
            .bind(submission.quiz_id)
            .bind(submission.lesson_id)
            .bind(&submission.answers)
            .bind(submission.score)
            .bind(submission.max_score)
            .bind(submission.submitted_at)
            .execute(mm.executor())
            .await?;

        Ok(submission)
    }

    pub async fn list_for_actor(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM quiz_submissions WHERE user_id = ? ORDER BY submitted_at DESC",
        )
        .bind(actor.user_id())
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}
