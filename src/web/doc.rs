use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct BearerAuthModifier;

impl Modify for BearerAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /api/v1/login or /api/v1/register"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "codecamp", description = "Learning platform API"),
    paths(
        crate::web::routes::index_handler,
        crate::web::routes::user::register_handler,
        crate::web::routes::user::login_handler,
        crate::web::routes::user::profile_get_handler,
        crate::web::routes::user::profile_update_handler,
        crate::web::routes::lessons::lessons_list_handler,
        crate::web::routes::lessons::lessons_get_handler,
        crate::web::routes::lessons::lessons_quiz_handler,
        crate::web::routes::lessons::lessons_quiz_submit_handler,
        crate::web::routes::lessons::lessons_progress_handler,
        crate::web::routes::lessons::lessons_hints_handler,
        crate::web::routes::progress::progress_list_handler,
        crate::web::routes::progress::submissions_list_handler,
        crate::web::routes::ai::chat_handler,
        crate::web::routes::ai::chat_history_handler,
        crate::web::routes::ai::code_evaluate_handler,
        crate::web::routes::ai::code_evaluations_handler,
        crate::web::routes::ai::code_explain_handler,
        crate::web::routes::ai::code_optimize_handler,
        crate::web::routes::ai::code_debug_handler,
        crate::web::routes::admin::admin_dashboard_handler,
        crate::web::routes::admin::admin_stats_handler,
        crate::web::routes::admin::admin_users_handler,
        crate::web::routes::admin::admin_promote_handler,
        crate::web::routes::admin::admin_lesson_create_handler,
        crate::web::routes::admin::admin_lesson_update_handler,
        crate::web::routes::admin::admin_lesson_delete_handler,
        crate::web::routes::admin::admin_quiz_create_handler,
        crate::web::routes::admin::admin_hint_create_handler,
    ),
    modifiers(&BearerAuthModifier),
)]
pub struct ApiDoc;
