use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    ai::AiError,
    auth::{CryptError, SessionError},
    error::log_error,
    model::{DatabaseError, ResourceType},
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("RegistrationUserConflict")]
    RegistrationUserConflict,
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationTokenMissing")]
    AuthenticationTokenMissing,

    #[error("AuthenticationTokenInvalid. Error: {error}")]
    AuthenticationTokenInvalid { error: SessionError },

    #[error("AuthenticationTokenExpired")]
    AuthenticationTokenExpired,

    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationAdminRequired")]
    AuthenticationAdminRequired,

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceConflict: {resource_type:?}")]
    ResourceConflict { resource_type: ResourceType },

    #[error("ResourceBadRequest: {resource_type:?}. {details}")]
    ResourceBadRequest {
        resource_type: ResourceType,
        details: String,
    },
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("UpstreamUnavailable: {0}")]
    UpstreamUnavailable(#[from] AiError),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] CryptError),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    pub fn client_display(&self) -> String {
        String::from("Internal server error.")
    }
}

impl RegistrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RegistrationUserConflict => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::RegistrationUserConflict => {
                String::from("Registration error, user already exists.")
            }
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationAdminRequired => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationTokenMissing => {
                String::from("Authentication error, bearer token not found.")
            }
            Self::AuthenticationTokenInvalid { .. } => {
                String::from("Authentication error, token invalid.")
            }
            Self::AuthenticationTokenExpired => {
                String::from("Authentication error, token expired.")
            }
            Self::AuthenticationRequired => String::from("Authentication required."),
            Self::AuthenticationAdminRequired => String::from("Admin access required."),
            Self::AuthenticationInvalidCredentials => {
                String::from("Authentication error, user not found or password is invalid.")
            }
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResourceConflict { .. } => StatusCode::CONFLICT,
            Self::ResourceBadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { .. } => String::from("Resource error, resource not found."),
            Self::ResourceFetchError { .. } => {
                String::from("Resource error, unable to fetch resource.")
            }
            Self::ResourceConflict { .. } => String::from("Resource error, resource already exists."),
            // validation messages are meant for the client
            Self::ResourceBadRequest { details, .. } => format!("Bad request, {details}."),
        }
    }
}

impl UpstreamError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_GATEWAY
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::UpstreamUnavailable(AiError::NotConfigured) => {
                String::from("AI assistant is not configured.")
            }
            Self::UpstreamUnavailable(_) => String::from("AI assistant is unavailable."),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("RegistrationError - {0}")]
    RegistrationError(#[from] RegistrationError),
    #[error("UpstreamError - {0}")]
    UpstreamError(#[from] UpstreamError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl WebError {
    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        Self::ResourceError(ResourceError::ResourceFetchError {
            resource_type: r#type,
            error,
        })
    }

    pub fn resource_conflict(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceConflict {
            resource_type: r#type,
        })
    }

    pub fn resource_bad_request<S: Into<String>>(r#type: ResourceType, details: S) -> Self {
        Self::ResourceError(ResourceError::ResourceBadRequest {
            resource_type: r#type,
            details: details.into(),
        })
    }

    pub fn auth_token_missing() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationTokenMissing)
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn admin_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationAdminRequired)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn registration_conflict() -> Self {
        Self::RegistrationError(RegistrationError::RegistrationUserConflict)
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn upstream_unavailable(e: AiError) -> Self {
        Self::UpstreamError(UpstreamError::UpstreamUnavailable(e))
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::RegistrationError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::UpstreamError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::RegistrationError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::UpstreamError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }
}

impl From<SessionError> for WebError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Expired => {
                Self::AuthenticationError(AuthenticationError::AuthenticationTokenExpired)
            }
            SessionError::Malformed(_) | SessionError::Unknown => {
                Self::AuthenticationError(AuthenticationError::AuthenticationTokenInvalid { error })
            }
            SessionError::Crypt(e) => Self::server_crypt_error(e),
            SessionError::Database(e) => Self::resource_fetch_error(ResourceType::Session, e),
        }
    }
}

impl From<AiError> for WebError {
    fn from(error: AiError) -> Self {
        Self::upstream_unavailable(error)
    }
}

#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub message: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();
        let display = self.client_display();

        let body = ErrorResponse {
            message: display,
            status_code: status_code.as_str().to_string(),
            details: None,
        };
        let detailed = DetailedError(ErrorResponse {
            details: Some(self.to_string()),
            ..body.clone()
        });

        let mut response = (status_code, Json(body)).into_response();
        response.extensions_mut().insert(detailed);
        response
    }
}

/// Error body with `details` filled in, swapped in by `expose_details_fn` in debug mode.
#[derive(Debug, Clone)]
pub struct DetailedError(pub ErrorResponse);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn session_errors_map_to_statuses() {
        assert_eq!(
            WebError::from(SessionError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WebError::from(SessionError::Unknown).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn ai_errors_are_bad_gateway() {
        let err = WebError::from(AiError::Timeout(std::time::Duration::from_secs(3)));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.client_display(), "AI assistant is unavailable.");

        let err = WebError::from(AiError::NotConfigured);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn details_stay_out_of_the_body() {
        let response = WebError::resource_not_found(ResourceType::Lesson).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let detailed = response.extensions().get::<DetailedError>().unwrap();
        assert_eq!(detailed.0.status_code, "404");
        assert!(detailed.0.details.as_deref().unwrap().contains("Lesson"));
    }

    #[test]
    fn bad_request_carries_details() {
        let err = WebError::resource_bad_request(ResourceType::User, "invalid email format");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_display(), "Bad request, invalid email format.");
    }
}
