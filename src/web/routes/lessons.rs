use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::model::entity::{
    Hint, Lesson, Progress, ProgressUpsert, Quiz, QuizSubmission, QuizSubmissionCreate,
};
use crate::model::{CrudRepository, ModelManager, ResourceTyped};
use crate::web::dto::lessons::{
    HintsResponse, LessonResponse, LessonsResponse, ProgressBody, ProgressResponse, QuizResponse,
    QuizSubmitBody, QuizSubmitResponse,
};
use crate::web::error::ErrorResponse;
use crate::web::{AppState, AuthenticatedUser, RequestContext, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/api/v1/lessons", get(lessons_list_handler))
        .route("/api/v1/lessons/{id}", get(lessons_get_handler))
        .route("/api/v1/lessons/{id}/quiz", get(lessons_quiz_handler))
        .route(
            "/api/v1/lessons/{id}/quiz/submit",
            post(lessons_quiz_submit_handler),
        )
        .route(
            "/api/v1/lessons/{id}/progress",
            post(lessons_progress_handler),
        )
        .route("/api/v1/lessons/{id}/hints", get(lessons_hints_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

pub(crate) async fn existing_lesson(
    mm: &ModelManager,
    user: &AuthenticatedUser,
    id: Uuid,
) -> WebResult<Lesson> {
    Lesson::find_by_id(mm, user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons",
    description = "Whole lesson catalog in course order",
    responses(
        (status = 200, description = "Lessons", body = LessonsResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "lessons"
)]
async fn lessons_list_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let lessons = Lesson::all_ordered(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(LessonsResponse { lessons })))
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}",
    description = "Fetch comprehensive info about lesson including its content",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to get")
    ),
    responses(
        (status = 200, description = "Lesson found", body = LessonResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "lessons"
)]
async fn lessons_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let lesson = existing_lesson(state.pool(), user, id).await?;

    Ok((StatusCode::OK, Json(LessonResponse { lesson })))
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}/quiz",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson")
    ),
    responses(
        (status = 200, description = "Quiz of the lesson", body = QuizResponse),
        (status = 404, description = "Lesson has no quiz", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "lessons"
)]
async fn lessons_quiz_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let quiz = Quiz::find_by_lesson(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Quiz::get_resource_type()))?;

    Ok((StatusCode::OK, Json(QuizResponse { quiz })))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/quiz/submit",
    description = "Stores answers for the lesson quiz. The score is clamped into `0..=max_score`",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson")
    ),
    request_body = QuizSubmitBody,
    responses(
        (status = 200, description = "Submission stored", body = QuizSubmitResponse),
        (status = 400, description = "Answers missing or score invalid", body = ErrorResponse),
        (status = 404, description = "Lesson has no quiz", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "lessons"
)]
async fn lessons_quiz_submit_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<QuizSubmitBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let answers = payload
        .answers
        .filter(|a| !a.is_null())
        .ok_or_else(|| {
            WebError::resource_bad_request(
                QuizSubmission::get_resource_type(),
                "answers are required",
            )
        })?;

    let quiz = Quiz::find_by_lesson(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Quiz::get_resource_type()))?;

    let (score, max_score) = clamp_score(
        payload.score,
        payload.max_score,
        f64::from(quiz.total_points()),
    )
    .ok_or_else(|| {
        WebError::resource_bad_request(
            QuizSubmission::get_resource_type(),
            "score and max_score must be finite and max_score non-negative",
        )
    })?;

    let data = QuizSubmissionCreate {
        quiz_id: quiz.id(),
        lesson_id: id,
        answers,
        score,
        max_score,
    };
    let submission = QuizSubmission::create(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(QuizSubmission::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(QuizSubmitResponse {
            message: String::from("Quiz submitted successfully"),
            score: submission.score(),
            max_score: submission.max_score(),
        }),
    ))
}

/// `None` when the numbers can't form a score.
fn clamp_score(score: Option<f64>, max_score: Option<f64>, total_points: f64) -> Option<(f64, f64)> {
    let max_score = max_score.unwrap_or(total_points);
    let score = score.unwrap_or(0.0);
    if !max_score.is_finite() || max_score < 0.0 || !score.is_finite() {
        return None;
    }
    Some((score.clamp(0.0, max_score), max_score))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/progress",
    description = "Creates or replaces the caller's progress on the lesson",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson")
    ),
    request_body = ProgressBody,
    responses(
        (status = 200, description = "Progress stored", body = ProgressResponse),
        (status = 400, description = "Percentage or time out of range", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "lessons"
)]
async fn lessons_progress_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<ProgressBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let data = progress_upsert(id, payload).map_err(|details| {
        WebError::resource_bad_request(Progress::get_resource_type(), details)
    })?;

    existing_lesson(state.pool(), user, id).await?;

    let progress = Progress::upsert(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Progress::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(ProgressResponse {
            message: String::from("Progress updated successfully"),
            progress,
        }),
    ))
}

fn progress_upsert(lesson_id: Uuid, body: ProgressBody) -> Result<ProgressUpsert, &'static str> {
    let completion_percentage = body.completion_percentage.unwrap_or(0.0);
    if !(0.0..=100.0).contains(&completion_percentage) {
        return Err("completion_percentage must be between 0 and 100");
    }

    let time_spent = body.time_spent.unwrap_or(0);
    if time_spent < 0 {
        return Err("time_spent must not be negative");
    }

    Ok(ProgressUpsert {
        lesson_id,
        completed: body.completed.unwrap_or(false),
        completion_percentage,
        time_spent,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}/hints",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson")
    ),
    responses(
        (status = 200, description = "Hints, easiest first", body = HintsResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "lessons"
)]
async fn lessons_hints_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    existing_lesson(state.pool(), user, id).await?;

    let hints = Hint::all_by_lesson(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Hint::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(HintsResponse { hints })))
}
