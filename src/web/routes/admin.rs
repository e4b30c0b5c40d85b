use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ModelManager, Page, PaginatableRepository, ResourceType, ResourceTyped,
        entity::{
            Difficulty, Hint, HintCreate, Lesson, LessonCreate, LessonPatch, MAX_HINT_LEVEL,
            MIN_HINT_LEVEL, Progress, Quiz, QuizCreate, UserEntity,
        },
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult,
        dto::{
            MessageResponse,
            admin::{
                CreatedResponse, DashboardResponse, HintCreateBody, LessonCreateBody,
                LessonCreatedResponse, LessonStats, LessonUpdateBody, PaginationQuery,
                QuizCreateBody, StatsResponse, UserStats,
            },
            lessons::LessonResponse,
            non_blank,
            user::ProfileResponse,
        },
        error::ErrorResponse,
        middlewares,
        routes::lessons::existing_lesson,
    },
};

pub const DEFAULT_QUIZ_POINTS: i32 = 100;

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/api/v1/admin", get(admin_dashboard_handler))
        .route("/api/v1/admin/", get(admin_dashboard_handler))
        .route("/api/v1/admin/stats", get(admin_stats_handler))
        .route("/api/v1/admin/users", get(admin_users_handler))
        .route(
            "/api/v1/admin/users/{id}/admin",
            post(admin_promote_handler),
        )
        .route("/api/v1/admin/lessons", post(admin_lesson_create_handler))
        .route(
            "/api/v1/admin/lessons/{id}",
            put(admin_lesson_update_handler).delete(admin_lesson_delete_handler),
        )
        .route(
            "/api/v1/admin/lessons/{id}/quiz",
            post(admin_quiz_create_handler),
        )
        .route(
            "/api/v1/admin/lessons/{id}/hints",
            post(admin_hint_create_handler),
        )
        .route_layer(middleware::from_fn(middlewares::require_admin_fn))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn parse_difficulty(value: &str) -> WebResult<Difficulty> {
    Difficulty::parse(value).ok_or_else(|| {
        WebError::resource_bad_request(
            Lesson::get_resource_type(),
            "difficulty must be one of beginner, intermediate, advanced",
        )
    })
}

async fn collect_stats(mm: &ModelManager, user: &AuthenticatedUser) -> WebResult<StatsResponse> {
    let stats_error = |e| WebError::resource_fetch_error(ResourceType::Stats, e);

    let (total_users, verified_users, admin_users) = tokio::try_join!(
        UserEntity::count(mm, user),
        UserEntity::count_verified(mm, user),
        UserEntity::count_by_role(mm, user, UserRole::Admin),
    )
    .map_err(stats_error)?;

    let (total_lessons, beginner_lessons, intermediate_lessons, advanced_lessons) = tokio::try_join!(
        Lesson::count(mm, user),
        Lesson::count_by_difficulty(mm, user, Difficulty::Beginner),
        Lesson::count_by_difficulty(mm, user, Difficulty::Intermediate),
        Lesson::count_by_difficulty(mm, user, Difficulty::Advanced),
    )
    .map_err(stats_error)?;

    let progress = Progress::stats(mm, user).await.map_err(stats_error)?;

    Ok(StatsResponse {
        users: UserStats {
            total_users,
            verified_users,
            admin_users,
        },
        lessons: LessonStats {
            total_lessons,
            beginner_lessons,
            intermediate_lessons,
            advanced_lessons,
        },
        progress,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/",
    responses(
        (status = 200, description = "Welcome message with platform stats", body = DashboardResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("bearer" = [])
    )
)]
async fn admin_dashboard_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_admin()?;
    let stats = collect_stats(state.pool(), user).await?;

    Ok((
        StatusCode::OK,
        Json(DashboardResponse {
            message: String::from("Welcome to admin dashboard"),
            stats,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    responses(
        (status = 200, description = "Platform statistics", body = StatsResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("bearer" = [])
    )
)]
async fn admin_stats_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_admin()?;
    let stats = collect_stats(state.pool(), user).await?;
    Ok((StatusCode::OK, Json(stats)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Returns requested page", body = Page<UserEntity>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("bearer" = [])
    )
)]
async fn admin_users_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_admin()?;
    let (limit, offset) = Page::<UserEntity>::bounds(page.limit, page.offset);

    let users = UserEntity::page(state.pool(), user, limit, offset)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(users)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{user_id}/admin",
    params(
        ("user_id" = Uuid, Path, description = "ID of the user to promote")
    ),
    responses(
        (status = 200, description = "User promoted", body = ProfileResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("bearer" = [])
    )
)]
async fn admin_promote_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_admin()?;
    let found = UserEntity::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let promoted = found
        .set_role(state.pool(), user, UserRole::Admin)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    tracing::info!(user_id = %promoted.id(), by = %user.user_id(), "user promoted to admin");
    Ok((StatusCode::OK, Json(ProfileResponse::from(&promoted))))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/lessons",
    request_body = LessonCreateBody,
    responses(
        (status = 200, description = "Lesson created", body = LessonCreatedResponse),
        (status = 400, description = "Title missing or difficulty unknown", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("bearer" = [])
    )
)]
async fn admin_lesson_create_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<LessonCreateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_admin()?;
    let title = non_blank(payload.title).ok_or_else(|| {
        WebError::resource_bad_request(Lesson::get_resource_type(), "title is required")
    })?;
    let difficulty = match non_blank(payload.difficulty) {
        Some(value) => parse_difficulty(&value)?,
        None => Difficulty::Beginner,
    };

    let data = LessonCreate {
        title: title.trim().to_string(),
        description: payload.description.unwrap_or_default(),
        difficulty,
        content: payload.content.unwrap_or_default(),
        order_index: payload.order_index.unwrap_or(0),
    };

    let lesson = Lesson::create(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(LessonCreatedResponse {
            message: String::from("Lesson created successfully"),
            lesson_id: lesson.id(),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/lessons/{lesson_id}",
    description = "Partial update, absent fields keep their value",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to update")
    ),
    request_body = LessonUpdateBody,
    responses(
        (status = 200, description = "Lesson updated", body = LessonResponse),
        (status = 400, description = "Nothing to update or invalid field", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("bearer" = [])
    )
)]
async fn admin_lesson_update_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<LessonUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_admin()?;
    let patch = lesson_patch(payload)?;
    if patch.is_empty() {
        return Err(WebError::resource_bad_request(
            Lesson::get_resource_type(),
            "no fields to update",
        ));
    }

    let found = existing_lesson(state.pool(), user, id).await?;
    let data = patch.merge_into(&found);
    let lesson = found
        .update(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(LessonResponse { lesson })))
}

fn lesson_patch(body: LessonUpdateBody) -> WebResult<LessonPatch> {
    if body.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(WebError::resource_bad_request(
            Lesson::get_resource_type(),
            "title must not be empty",
        ));
    }

    let difficulty = match body.difficulty {
        Some(value) => Some(parse_difficulty(&value)?),
        None => None,
    };

    Ok(LessonPatch {
        title: body.title.map(|t| t.trim().to_string()),
        description: body.description,
        difficulty,
        content: body.content,
        order_index: body.order_index,
    })
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/lessons/{lesson_id}",
    description = "Deletes the lesson with its quiz, hints and learner progress",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to delete")
    ),
    responses(
        (status = 200, description = "Lesson deleted", body = MessageResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("bearer" = [])
    )
)]
async fn admin_lesson_delete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_admin()?;
    let found = existing_lesson(state.pool(), user, id).await?;

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Lesson deleted successfully")),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/lessons/{lesson_id}/quiz",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson")
    ),
    request_body = QuizCreateBody,
    responses(
        (status = 200, description = "Quiz created", body = CreatedResponse),
        (status = 400, description = "Title or questions missing", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 409, description = "Lesson already has a quiz", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("bearer" = [])
    )
)]
async fn admin_quiz_create_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<QuizCreateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_admin()?;
    let (Some(title), Some(questions)) = (
        non_blank(payload.title),
        payload.questions.filter(|q| !q.is_null()),
    ) else {
        return Err(WebError::resource_bad_request(
            Quiz::get_resource_type(),
            "title and questions are required",
        ));
    };

    let total_points = payload.total_points.unwrap_or(DEFAULT_QUIZ_POINTS);
    if total_points < 0 {
        return Err(WebError::resource_bad_request(
            Quiz::get_resource_type(),
            "total_points must not be negative",
        ));
    }

    existing_lesson(state.pool(), user, id).await?;

    let data = QuizCreate {
        lesson_id: id,
        title: title.trim().to_string(),
        questions,
        total_points,
    };
    let quiz = Quiz::create(state.pool(), user, data).await.map_err(|e| {
        if e.is_unique_violation() {
            WebError::resource_conflict(Quiz::get_resource_type())
        } else {
            WebError::resource_fetch_error(Quiz::get_resource_type(), e)
        }
    })?;

    Ok((
        StatusCode::OK,
        Json(CreatedResponse {
            message: String::from("Quiz created successfully"),
            id: quiz.id(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/lessons/{lesson_id}/hints",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson")
    ),
    request_body = HintCreateBody,
    responses(
        (status = 200, description = "Hint created", body = CreatedResponse),
        (status = 400, description = "Text missing or level out of range", body = ErrorResponse),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "You're not an admin", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "admin",
    security(
        ("bearer" = [])
    )
)]
async fn admin_hint_create_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(payload): Json<HintCreateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.require_admin()?;
    let hint_text = non_blank(payload.hint_text).ok_or_else(|| {
        WebError::resource_bad_request(Hint::get_resource_type(), "hint_text is required")
    })?;

    let difficulty_level = payload.difficulty_level.unwrap_or(MIN_HINT_LEVEL);
    if !(MIN_HINT_LEVEL..=MAX_HINT_LEVEL).contains(&difficulty_level) {
        return Err(WebError::resource_bad_request(
            Hint::get_resource_type(),
            format!("difficulty_level must be between {MIN_HINT_LEVEL} and {MAX_HINT_LEVEL}"),
        ));
    }

    existing_lesson(state.pool(), user, id).await?;

    let hint = Hint::create(
        state.pool(),
        user,
        HintCreate {
            lesson_id: id,
            hint_text,
            difficulty_level,
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(Hint::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(CreatedResponse {
            message: String::from("Hint created successfully"),
            id: hint.id(),
        }),
    ))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lesson_patch_validates_fields() {
        let patch = lesson_patch(LessonUpdateBody {
            difficulty: Some(String::from("Advanced")),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.difficulty, Some(Difficulty::Advanced));

        assert!(
            lesson_patch(LessonUpdateBody {
                difficulty: Some(String::from("expert")),
                ..Default::default()
            })
            .is_err()
        );

        assert!(
            lesson_patch(LessonUpdateBody {
                title: Some(String::from("  ")),
                ..Default::default()
            })
            .is_err()
        );

        assert!(lesson_patch(LessonUpdateBody::default()).unwrap().is_empty());
    }
}
