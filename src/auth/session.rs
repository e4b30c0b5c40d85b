//! Token issuer: opaque server-side sessions wrapped in a signed bearer JWT.
//!

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use serde::Serialize;

use crate::{
    auth::{CryptError, SessionError, SessionResult, UserClaims, generate_token, jwt, token},
    config,
    model::{
        CrudRepository, ModelManager,
        entity::{Session, SessionCreate, UserEntity},
    },
    web::AuthenticatedUser,
};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TokenIssuer {
    secret: String,
    token_length: usize,
    lifetime: chrono::Duration,
}

impl TokenIssuer {
    pub fn new<S: Into<String>>(secret: S, token_length: usize, lifetime: chrono::Duration) -> Self {
        Self {
            secret: secret.into(),
            token_length,
            lifetime,
        }
    }

    pub fn from_config(app: &config::App) -> Self {
        Self::new(app.secret_key(), app.token_length(), app.token_lifetime())
    }

    /// Hands out a bearer token for `user`, reusing a still valid session when there is one.
    #[tracing::instrument(skip_all, fields(user_id = %user.id()))]
    pub async fn issue(&self, mm: &ModelManager, user: &UserEntity) -> SessionResult<IssuedToken> {
        let system = AuthenticatedUser::system();
        let now = Utc::now();

        let session = match Session::find_active_for_user(mm, &system, user.id(), now).await? {
            Some(session) => {
                tracing::debug!("reusing active session");
                session
            }
            None => {
                let data = SessionCreate {
                    token: token::generate_token(self.token_length),
                    user_id: user.id(),
                    expires_at: now + self.lifetime,
                };
                Session::create(mm, &system, data).await?
            }
        };

        self.sign(&session)
    }

    fn sign(&self, session: &Session) -> SessionResult<IssuedToken> {
        let claims = UserClaims {
            sub: session.user_id().to_string(),
            sid: session.token().to_string(),
            iat: session.issued_at().timestamp(),
            exp: session.expires_at().timestamp(),
        };

        let token = generate_token(&claims, &self.secret).map_err(CryptError::from)?;
        Ok(IssuedToken {
            token,
            expires_at: *session.expires_at(),
        })
    }

    /// Resolves a bearer token to its user.
    #[tracing::instrument(skip_all)]
    pub async fn validate(&self, mm: &ModelManager, bearer: &str) -> SessionResult<UserEntity> {
        let claims = jwt::process_token(bearer, &self.secret)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Malformed(e),
            })?
            .claims;

        let system = AuthenticatedUser::system();
        let session = Session::find_by_token(mm, &system, &claims.sid)
            .await?
            .ok_or(SessionError::Unknown)?;

        if session.user_id().to_string() != claims.sub {
            return Err(SessionError::Unknown);
        }

        if session.is_expired_at(Utc::now()) {
            return Err(SessionError::Expired);
        }

        UserEntity::find_by_id(mm, &system, session.user_id())
            .await?
            .ok_or(SessionError::Unknown)
    }

    pub async fn cleanup_expired(&self, mm: &ModelManager) -> SessionResult<u64> {
        let removed = Session::cleanup_expired(mm, &AuthenticatedUser::system(), Utc::now()).await?;
        Ok(removed)
    }
}
