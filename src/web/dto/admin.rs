use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::ProgressStats;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LessonCreateBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub content: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct LessonUpdateBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<String>,
    pub content: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LessonCreatedResponse {
    pub message: String,
    pub lesson_id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct QuizCreateBody {
    pub title: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub questions: Option<serde_json::Value>,
    pub total_points: Option<i32>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct HintCreateBody {
    pub hint_text: Option<String>,
    pub difficulty_level: Option<i32>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CreatedResponse {
    pub message: String,
    pub id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PaginationQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserStats {
    pub total_users: i64,
    pub verified_users: i64,
    pub admin_users: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LessonStats {
    pub total_lessons: i64,
    pub beginner_lessons: i64,
    pub intermediate_lessons: i64,
    pub advanced_lessons: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StatsResponse {
    pub users: UserStats,
    pub lessons: LessonStats,
    pub progress: ProgressStats,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    pub message: String,
    pub stats: StatsResponse,
}
