use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::{
    model::{DatabaseResult, ModelManager, ResourceType, ResourceTyped},
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CodeEvaluation {
    id: Uuid,
    user_id: Uuid,
    lesson_id: Option<Uuid>,
    code: String,
    output: String,
    error: Option<String>,
    execution_time: f64,
    language: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CodeEvaluationCreate {
    pub lesson_id: Option<Uuid>,
    pub code: String,
    pub output: String,
    pub error: Option<String>,
    pub execution_time: f64,
    pub language: String,
}

impl ResourceTyped for CodeEvaluation {
    fn get_resource_type() -> ResourceType {
        ResourceType::CodeEvaluation
    }
}

impl CodeEvaluation {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn execution_time(&self) -> f64 {
        self.execution_time
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: CodeEvaluationCreate,
    ) -> DatabaseResult<Self> {
        let evaluation = CodeEvaluation {
            id: Uuid::new_v4(),
            user_id: actor.user_id(),
            lesson_id: data.lesson_id,
            code: data.code,
            output: data.output,
            error: data.error,
            execution_time: data.execution_time,
            language: data.language,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO code_evaluations (id, user_id, lesson_id, code, output, error, execution_time, language, created_at) VALUES (?,?,?,?,?,?,?,?,?)")
            .bind(evaluation.id)
            .bind(evaluation.user_id)
            .bind(evaluation.lesson_id)
            .bind(&evaluation.code)
            .bind(&evaluation.output)
            .bind(&evaluation.error)
            .bind(evaluation.execution_time)
            .bind(&evaluation.language)
            .bind(evaluation.created_at)
            .execute(mm.executor())
            .await?;

        Ok(evaluation)
    }

    pub async fn list_for_actor(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM code_evaluations WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(actor.user_id())
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}
