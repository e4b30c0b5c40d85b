use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::{
    model::{DatabaseResult, ModelManager, ResourceType, ResourceTyped},
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct AiInteraction {
    id: Uuid,
    user_id: Uuid,
    kind: String,
    input_code: String,
    output: String,
    language: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct AiInteractionCreate {
    pub kind: String,
    pub input_code: String,
    pub output: String,
    pub language: String,
}

impl ResourceTyped for AiInteraction {
    fn get_resource_type() -> ResourceType {
        ResourceType::AiInteraction
    }
}

impl AiInteraction {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: AiInteractionCreate,
    ) -> DatabaseResult<Self> {
        let interaction = AiInteraction {
            id: Uuid::new_v4(),
            user_id: actor.user_id(),
            kind: data.kind,
            input_code: data.input_code,
            output: data.output,
            language: data.language,
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO ai_interactions (id, user_id, kind, input_code, output, language, created_at) VALUES (?,?,?,?,?,?,?)")
            .bind(interaction.id)
            .bind(interaction.user_id)
            .bind(&interaction.kind)
            .bind(&interaction.input_code)
            .bind(&interaction.output)
            .bind(&interaction.language)
            .bind(interaction.created_at)
            .execute(mm.executor())
            .await?;

        Ok(interaction)
    }
}
