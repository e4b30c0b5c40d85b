use axum::{Json, Router, http::StatusCode, middleware, response::IntoResponse, routing::get};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{AppState, doc::ApiDoc, middlewares};

pub mod admin;
pub mod ai;
pub mod lessons;
pub mod progress;
pub mod user;

pub const API_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ApiEndpoints {
    auth: &'static str,
    lessons: &'static str,
    user: &'static str,
    assistant: &'static str,
    admin: &'static str,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ApiInfo {
    version: &'static str,
    message: &'static str,
    endpoints: ApiEndpoints,
}

#[utoipa::path(
    get,
    path = "/api/v1/",
    description = "API version and entry points",
    responses(
        (status = 200, description = "API info", body = ApiInfo),
    ),
    tag = "info"
)]
async fn index_handler() -> impl IntoResponse {
    let info = ApiInfo {
        version: API_VERSION,
        message: "Welcome to the Learning Platform API",
        endpoints: ApiEndpoints {
            auth: "/api/v1/login, /api/v1/register",
            lessons: "/api/v1/lessons",
            user: "/api/v1/profile",
            assistant: "/api/v1/chat, /api/v1/code/evaluate",
            admin: "/api/v1/admin",
        },
    };
    (StatusCode::OK, Json(info))
}

pub fn build_app<S: Send + Sync + Clone + 'static>(state: AppState) -> Router<S> {
    let debug = state.config().host().debug();

    let mut router = Router::new()
        .route("/api/v1", get(index_handler))
        .route("/api/v1/", get(index_handler))
        .merge(user::routes(state.clone()))
        .merge(lessons::routes(state.clone()))
        .merge(progress::routes(state.clone()))
        .merge(ai::routes(state.clone()))
        .merge(admin::routes(state.clone()));

    if debug {
        let openapi = ApiDoc::openapi();
        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
        .layer(middleware::from_fn_with_state(
            state,
            middlewares::expose_details_fn,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}
