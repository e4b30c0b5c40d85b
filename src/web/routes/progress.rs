use axum::{
    Json, Router, extract::State, http::StatusCode, middleware, response::IntoResponse,
    routing::get,
};

use crate::model::ResourceTyped;
use crate::model::entity::{Progress, QuizSubmission};
use crate::web::dto::lessons::{ProgressListResponse, SubmissionsResponse};
use crate::web::error::ErrorResponse;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/api/v1/progress", get(progress_list_handler))
        .route("/api/v1/quiz-submissions", get(submissions_list_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/progress",
    description = "Progress of the current user, most recently touched first",
    responses(
        (status = 200, description = "Progress records", body = ProgressListResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "progress"
)]
async fn progress_list_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let progress = Progress::list_for_actor(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Progress::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(ProgressListResponse { progress })))
}

#[utoipa::path(
    get,
    path = "/api/v1/quiz-submissions",
    responses(
        (status = 200, description = "Quiz submissions of the current user", body = SubmissionsResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "progress"
)]
async fn submissions_list_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let submissions = QuizSubmission::list_for_actor(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizSubmission::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(SubmissionsResponse { submissions })))
}
