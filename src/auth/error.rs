use thiserror::Error;

use crate::model::DatabaseError;

pub type CryptResult<T> = std::result::Result<T, CryptError>;

#[derive(Debug, Error)]
pub enum CryptError {
    #[error("argon2 error: {0}")]
    Argon2Error(#[from] argon2::password_hash::Error),
    #[error("jwt error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session token is malformed: {0}")]
    Malformed(jsonwebtoken::errors::Error),
    #[error("session token has expired")]
    Expired,
    #[error("session token is unknown")]
    Unknown,
    #[error("crypt error: {0}")]
    Crypt(#[from] CryptError),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}
