use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    auth::{hash_password, is_valid_email, is_valid_password, verify_password},
    model::{
        CrudRepository, DatabaseError, ResourceTyped,
        entity::{UserEntity, UserEntityCreateUpdate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult,
        dto::{
            non_blank,
            user::{LoginBody, ProfileResponse, ProfileUpdateBody, RegisterBody, TokenResponse},
        },
        error::ErrorResponse,
        middlewares,
    },
};

/// A taken email surfaces as a unique violation when the pre-check lost a race.
fn user_write_error(e: DatabaseError) -> WebError {
    if e.is_unique_violation() {
        WebError::registration_conflict()
    } else {
        WebError::resource_fetch_error(UserEntity::get_resource_type(), e)
    }
}

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route(
            "/api/v1/profile",
            get(profile_get_handler).put(profile_update_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/api/v1/register", post(register_handler))
        .route("/api/v1/login", post(login_handler))
        .merge(protected)
        .with_state(state)
}

fn bad_request(details: &str) -> WebError {
    WebError::resource_bad_request(UserEntity::get_resource_type(), details)
}

#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterBody,
    description = "Creates new user and hands out its first bearer token",
    responses(
        (status = 200, description = "User registered successfully", body = TokenResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 409, description = "User already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account"
)]
#[tracing::instrument(skip_all)]
async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterBody>,
) -> WebResult<impl IntoResponse> {
    let (Some(email), Some(password), Some(name)) = (
        non_blank(payload.email),
        payload.password.filter(|p| !p.is_empty()),
        non_blank(payload.name),
    ) else {
        return Err(bad_request("email, password and name are required"));
    };

    let email = email.trim().to_string();
    if !is_valid_email(&email) {
        return Err(bad_request("invalid email format"));
    }
    if !is_valid_password(&password) {
        return Err(bad_request("password must be at least 8 characters long"));
    }

    let system = AuthenticatedUser::system();
    let found = UserEntity::find_by_email(state.pool(), &system, &email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if found.is_some() {
        return Err(WebError::registration_conflict());
    }

    let hash = hash_password(&password).map_err(WebError::server_crypt_error)?;
    let payload = UserEntityCreateUpdate {
        email,
        name: name.trim().to_string(),
        password_hash: hash,
    };

    // two concurrent registrations can race past the lookup above
    let created = UserEntity::create(state.pool(), &system, payload)
        .await
        .map_err(user_write_error)?;

    let issued = state.issuer().issue(state.pool(), &created).await?;
    tracing::info!(user_id = %created.id(), "user registered");

    Ok((
        StatusCode::OK,
        Json(TokenResponse {
            message: String::from("User registered successfully"),
            email: created.email().to_string(),
            token: issued.token,
            expires_at: issued.expires_at,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/login",
    description = "Authorizes user in the system",
    request_body = LoginBody,
    responses(
        (status = 200, description = "User signed in", body = TokenResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
)]
#[tracing::instrument(skip_all)]
async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginBody>,
) -> WebResult<impl IntoResponse> {
    let (Some(email), Some(password)) = (
        non_blank(payload.email),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(bad_request("email and password are required"));
    };

    let email = email.trim();
    if !is_valid_email(email) {
        return Err(bad_request("invalid email format"));
    }

    let system = AuthenticatedUser::system();
    let found = UserEntity::find_by_email(state.pool(), &system, email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(WebError::auth_invalid_credentials)?;

    let is_verified = verify_password(found.hash(), &password)
        .map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    let issued = state.issuer().issue(state.pool(), &found).await?;

    Ok((
        StatusCode::OK,
        Json(TokenResponse {
            message: String::from("Login successful"),
            email: found.email().to_string(),
            token: issued.token,
            expires_at: issued.expires_at,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Current user profile", body = ProfileResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("bearer" = [])
    )
)]
async fn profile_get_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    Ok((StatusCode::OK, Json(ProfileResponse::from(&found))))
}

#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = ProfileUpdateBody,
    description = "Updates name and/or email of the current user",
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Nothing to update or invalid email", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 409, description = "Email is taken by another user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("bearer" = [])
    )
)]
async fn profile_update_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<ProfileUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let name = non_blank(payload.name);
    let email = non_blank(payload.email).map(|e| e.trim().to_string());

    if name.is_none() && email.is_none() {
        return Err(bad_request("name or email is required"));
    }
    if email.as_deref().is_some_and(|e| !is_valid_email(e)) {
        return Err(bad_request("invalid email format"));
    }

    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    if let Some(email) = email.as_deref().filter(|e| *e != found.email()) {
        let conflict = UserEntity::find_by_email(state.pool(), user, email)
            .await
            .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;
        if conflict.is_some() {
            return Err(WebError::registration_conflict());
        }
    }

    let payload = UserEntityCreateUpdate {
        email: email.unwrap_or_else(|| found.email().to_string()),
        name: name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| found.name().to_string()),
        password_hash: found.hash().to_string(),
    };

    let updated = found
        .update(state.pool(), user, payload)
        .await
        .map_err(user_write_error)?;

    Ok((StatusCode::OK, Json(ProfileResponse::from(&updated))))
}
