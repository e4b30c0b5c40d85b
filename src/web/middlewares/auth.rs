use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::web::{AppState, RequestContext, context::AuthenticatedUser, error::WebError};

pub static BEARER_PREFIX: &str = "Bearer ";

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let prefix = value.get(..BEARER_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }

    let token = value[BEARER_PREFIX.len()..].trim();
    (!token.is_empty()).then_some(token)
}

/// Guards protected routes: resolves the bearer token to a user or answers 401.
pub async fn extract_context_fn(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(WebError::auth_token_missing)?;

    let user = state.issuer().validate(state.pool(), token).await?;

    tracing::debug!(user_id = %user.id(), "request authenticated");
    req.extensions_mut()
        .insert(RequestContext::new(Some(AuthenticatedUser::new(
            user.id(),
            user.role(),
        ))));

    Ok(next.run(req).await)
}

/// Runs inside `extract_context_fn`, so the role is checked before any body is read.
pub async fn require_admin_fn(req: Request, next: Next) -> Result<Response, WebError> {
    req.extensions()
        .get::<RequestContext>()
        .ok_or_else(WebError::auth_required)?
        .require_admin()?;

    Ok(next.run(req).await)
}
