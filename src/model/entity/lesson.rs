use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Lesson {
    id: Uuid,
    title: String,
    description: String,
    difficulty: String,
    content: String,
    order_index: i32,
    created_at: DateTime<Utc>,
}

impl ResourceTyped for Lesson {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Lesson
    }
}

impl Lesson {
    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::parse(&self.difficulty).unwrap_or(Difficulty::Beginner)
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonCreate {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub content: String,
    pub order_index: i32,
}

/// Partial update, absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LessonPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub content: Option<String>,
    pub order_index: Option<i32>,
}

impl LessonPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.difficulty.is_none()
            && self.content.is_none()
            && self.order_index.is_none()
    }

    pub fn merge_into(self, lesson: &Lesson) -> LessonCreate {
        LessonCreate {
            title: self.title.unwrap_or_else(|| lesson.title.clone()),
            description: self
                .description
                .unwrap_or_else(|| lesson.description.clone()),
            difficulty: self.difficulty.unwrap_or_else(|| lesson.difficulty()),
            content: self.content.unwrap_or_else(|| lesson.content.clone()),
            order_index: self.order_index.unwrap_or(lesson.order_index),
        }
    }
}

#[async_trait]
impl CrudRepository<Lesson, LessonCreate, uuid::Uuid> for Lesson {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        let lesson = Lesson {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            difficulty: data.difficulty.to_string(),
            content: data.content,
            order_index: data.order_index,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO lessons (id, title, description, difficulty, content, order_index, created_at) VALUES (?,?,?,?,?,?,?)")
            .bind(lesson.id)
            .bind(&lesson.title)
            .bind(&lesson.description)
            .bind(&lesson.difficulty)
            .bind(&lesson.content)
            .bind(lesson.order_index)
            .bind(lesson.created_at)
            .execute(mm.executor())
            .await?;

        Ok(lesson)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: LessonCreate,
    ) -> DatabaseResult<Self> {
        let difficulty = data.difficulty.to_string();
        sqlx::query("UPDATE lessons SET title = ?, description = ?, difficulty = ?, content = ?, order_index = ? WHERE id = ?")
            .bind(&data.title)
            .bind(&data.description)
            .bind(&difficulty)
            .bind(&data.content)
            .bind(data.order_index)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.title = data.title;
        self.description = data.description;
        self.difficulty = difficulty;
        self.content = data.content;
        self.order_index = data.order_index;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM lessons WHERE id = ?")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: uuid::Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM lessons WHERE id = ?")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM lessons ORDER BY order_index ASC, created_at ASC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl Lesson {
    /// Whole catalog in course order.
    pub async fn all_ordered(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM lessons ORDER BY order_index ASC, created_at ASC")
                .fetch_all(mm.executor())
                .await?;
        Ok(result)
    }

    pub async fn count_by_difficulty(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        difficulty: Difficulty,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE difficulty = ?")
            .bind(difficulty.to_string())
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn difficulty_parsing_is_case_insensitive() {
        assert_eq!(Difficulty::parse("Beginner"), Some(Difficulty::Beginner));
        assert_eq!(Difficulty::parse(" ADVANCED "), Some(Difficulty::Advanced));
        assert_eq!(Difficulty::parse("expert"), None);
    }

    #[test]
    fn patch_keeps_unset_fields() {
        let lesson = Lesson {
            id: Uuid::new_v4(),
            title: String::from("Loops"),
            description: String::from("for and while"),
            difficulty: String::from("beginner"),
            content: String::from("..."),
            order_index: 3,
            created_at: Utc::now(),
        };

        let patch = LessonPatch {
            title: Some(String::from("Iteration")),
            difficulty: Some(Difficulty::Intermediate),
            ..Default::default()
        };
        assert!(!patch.is_empty());

        let merged = patch.merge_into(&lesson);
        assert_eq!(merged.title, "Iteration");
        assert_eq!(merged.description, "for and while");
        assert_eq!(merged.difficulty, Difficulty::Intermediate);
        assert_eq!(merged.order_index, 3);
    }
}
