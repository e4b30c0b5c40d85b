use serde::{Deserialize, Serialize};

use crate::model::entity::{Hint, Lesson, Progress, Quiz, QuizSubmission};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LessonsResponse {
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LessonResponse {
    pub lesson: Lesson,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QuizResponse {
    pub quiz: Quiz,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct QuizSubmitBody {
    #[schema(value_type = Option<Object>)]
    pub answers: Option<serde_json::Value>,
    pub score: Option<f64>,
    pub max_score: Option<f64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QuizSubmitResponse {
    pub message: String,
    pub score: f64,
    pub max_score: f64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SubmissionsResponse {
    pub submissions: Vec<QuizSubmission>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct ProgressBody {
    pub completed: Option<bool>,
    pub completion_percentage: Option<f64>,
    pub time_spent: Option<i64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProgressResponse {
    pub message: String,
    pub progress: Progress,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProgressListResponse {
    pub progress: Vec<Progress>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HintsResponse {
    pub hints: Vec<Hint>,
}
