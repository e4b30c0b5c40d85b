use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};

use crate::ai::{AssistKind, DEFAULT_LANGUAGE};
use crate::model::ResourceTyped;
use crate::model::entity::{
    AiInteraction, AiInteractionCreate, ChatLog, CodeEvaluation, CodeEvaluationCreate,
};
use crate::web::dto::ai::{
    ChatBody, ChatHistoryQuery, ChatHistoryResponse, ChatResponse, CodeAssistBody,
    CodeAssistResponse, EvaluateBody, EvaluateResponse, EvaluationsResponse,
};
use crate::web::dto::non_blank;
use crate::web::error::ErrorResponse;
use crate::web::routes::lessons::existing_lesson;
use crate::web::{AppState, RequestContext, WebError, WebResult, middlewares};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/api/v1/chat", post(chat_handler))
        .route("/api/v1/chat/history", get(chat_history_handler))
        .route("/api/v1/code/evaluate", post(code_evaluate_handler))
        .route("/api/v1/code/evaluations", get(code_evaluations_handler))
        .route("/api/v1/code/explain", post(code_explain_handler))
        .route("/api/v1/code/optimize", post(code_optimize_handler))
        .route("/api/v1/code/debug", post(code_debug_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn language_or_default(language: Option<String>) -> String {
    non_blank(language)
        .map(|l| l.trim().to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

#[utoipa::path(
    post,
    path = "/api/v1/chat",
    description = "Asks the AI tutor a question. The exchange is kept in the chat history",
    request_body = ChatBody,
    responses(
        (status = 200, description = "Tutor answer", body = ChatResponse),
        (status = 400, description = "Message missing", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 502, description = "AI provider unavailable", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "assistant"
)]
#[tracing::instrument(skip_all)]
async fn chat_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<ChatBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let message = non_blank(payload.message).ok_or_else(|| {
        WebError::resource_bad_request(ChatLog::get_resource_type(), "message is required")
    })?;

    let answer = state.assistant().chat(&message).await?;

    ChatLog::create(state.pool(), user, message, answer.text.clone())
        .await
        .map_err(|e| WebError::resource_fetch_error(ChatLog::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(ChatResponse {
            response: answer.text,
            model: answer.model,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/chat/history",
    params(
        ChatHistoryQuery
    ),
    responses(
        (status = 200, description = "Chat history, newest first", body = ChatHistoryResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "assistant"
)]
async fn chat_history_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ChatHistoryQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let history = ChatLog::history(state.pool(), user, query.limit())
        .await
        .map_err(|e| WebError::resource_fetch_error(ChatLog::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(ChatHistoryResponse { history })))
}

#[utoipa::path(
    post,
    path = "/api/v1/code/evaluate",
    description = "Has the AI assistant review submitted code. Nothing is executed locally",
    request_body = EvaluateBody,
    responses(
        (status = 200, description = "Evaluation stored", body = EvaluateResponse),
        (status = 400, description = "Code missing", body = ErrorResponse),
        (status = 404, description = "Referenced lesson not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 502, description = "AI provider unavailable", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "assistant"
)]
#[tracing::instrument(skip_all)]
async fn code_evaluate_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<EvaluateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let code = non_blank(payload.code).ok_or_else(|| {
        WebError::resource_bad_request(CodeEvaluation::get_resource_type(), "code is required")
    })?;
    let language = language_or_default(payload.language);

    if let Some(lesson_id) = payload.lesson_id {
        existing_lesson(state.pool(), user, lesson_id).await?;
    }

    let started = Instant::now();
    let result = state
        .assistant()
        .code(AssistKind::Evaluate, &code, &language, None)
        .await;
    let execution_time = started.elapsed().as_secs_f64();

    // failed attempts are recorded too
    let (output, error) = match &result {
        Ok(answer) => (answer.text.clone(), None),
        Err(e) => (String::new(), Some(e.to_string())),
    };

    let evaluation = CodeEvaluation::create(
        state.pool(),
        user,
        CodeEvaluationCreate {
            lesson_id: payload.lesson_id,
            code,
            output,
            error,
            execution_time,
            language,
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(CodeEvaluation::get_resource_type(), e))?;

    result?;

    Ok((
        StatusCode::OK,
        Json(EvaluateResponse {
            id: evaluation.id(),
            output: evaluation.output().to_string(),
            execution_time: evaluation.execution_time(),
            language: evaluation.language().to_string(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/code/evaluations",
    responses(
        (status = 200, description = "Past evaluations of the current user", body = EvaluationsResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "assistant"
)]
async fn code_evaluations_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let evaluations = CodeEvaluation::list_for_actor(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(CodeEvaluation::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(EvaluationsResponse { evaluations })))
}

async fn code_assist(
    state: &AppState,
    ctx: &RequestContext,
    kind: AssistKind,
    payload: CodeAssistBody,
) -> WebResult<CodeAssistResponse> {
    let user = ctx.user()?;
    let code = non_blank(payload.code).ok_or_else(|| {
        WebError::resource_bad_request(AiInteraction::get_resource_type(), "code is required")
    })?;
    let language = language_or_default(payload.language);

    let answer = state
        .assistant()
        .code(kind, &code, &language, payload.error_message.as_deref())
        .await?;

    let interaction = AiInteraction::create(
        state.pool(),
        user,
        AiInteractionCreate {
            kind: kind.as_str().to_string(),
            input_code: code,
            output: answer.text,
            language: language.clone(),
        },
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(AiInteraction::get_resource_type(), e))?;

    Ok(CodeAssistResponse {
        kind: interaction.kind().to_string(),
        output: interaction.output().to_string(),
        language,
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/code/explain",
    request_body = CodeAssistBody,
    responses(
        (status = 200, description = "Explanation", body = CodeAssistResponse),
        (status = 400, description = "Code missing", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 502, description = "AI provider unavailable", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "assistant"
)]
async fn code_explain_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<CodeAssistBody>,
) -> WebResult<impl IntoResponse> {
    let response = code_assist(&state, &ctx, AssistKind::Explain, payload).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/code/optimize",
    request_body = CodeAssistBody,
    responses(
        (status = 200, description = "Suggested improvements", body = CodeAssistResponse),
        (status = 400, description = "Code missing", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 502, description = "AI provider unavailable", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "assistant"
)]
async fn code_optimize_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<CodeAssistBody>,
) -> WebResult<impl IntoResponse> {
    let response = code_assist(&state, &ctx, AssistKind::Optimize, payload).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/code/debug",
    description = "Debugging help, `error_message` is passed along when present",
    request_body = CodeAssistBody,
    responses(
        (status = 200, description = "Debugging advice", body = CodeAssistResponse),
        (status = 400, description = "Code missing", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 502, description = "AI provider unavailable", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "assistant"
)]
async fn code_debug_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<CodeAssistBody>,
) -> WebResult<impl IntoResponse> {
    let response = code_assist(&state, &ctx, AssistKind::Debug, payload).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn language_defaults_to_python() {
        assert_eq!(language_or_default(None), "python");
        assert_eq!(language_or_default(Some(String::from(" "))), "python");
        assert_eq!(language_or_default(Some(String::from("Rust"))), "rust");
    }
}
