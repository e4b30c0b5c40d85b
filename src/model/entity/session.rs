use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::{
    model::{DatabaseResult, ModelManager, ResourceType, ResourceTyped},
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    id: Uuid,
    token: String,
    user_id: Uuid,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreate {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl ResourceTyped for Session {
    fn get_resource_type() -> ResourceType {
        ResourceType::Session
    }
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn issued_at(&self) -> &DateTime<Utc> {
        &self.issued_at
    }

    pub fn expires_at(&self) -> &DateTime<Utc> {
        &self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: SessionCreate,
    ) -> DatabaseResult<Self> {
        let session = Session {
            id: Uuid::new_v4(),
            token: data.token,
            user_id: data.user_id,
            issued_at: Utc::now(),
            expires_at: data.expires_at,
        };

        sqlx::query("INSERT INTO sessions (id, token, user_id, issued_at, expires_at) VALUES (?,?,?,?,?)")
            .bind(session.id)
            .bind(&session.token)
            .bind(session.user_id)
            .bind(session.issued_at)
            .bind(session.expires_at)
            .execute(mm.executor())
            .await?;

        Ok(session)
    }

    pub async fn find_by_token(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        token: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

    /// Latest session of the user that is still valid at `now`.
    pub async fn find_active_for_user(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<Self>> {
        let sessions: Vec<Self> =
            sqlx::query_as("SELECT * FROM sessions WHERE user_id = ? ORDER BY issued_at DESC")
                .bind(user_id)
                .fetch_all(mm.executor())
                .await?;

        Ok(sessions.into_iter().find(|s| !s.is_expired_at(now)))
    }

    pub async fn cleanup_expired(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        now: DateTime<Utc>,
    ) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(mm.executor())
            .await?;

        Ok(result.rows_affected())
    }
}
