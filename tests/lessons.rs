mod common;
use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::common::{
    Action, Flow, FlowServer, PASSWORD, admin_lesson_path, create_lesson_action, lesson_path,
    login_action, register_action, setup_server,
};

async fn server_with_admin() -> FlowServer {
    let server = setup_server().await;
    server.seed_admin("admin@example.com").await;
    server
}

fn titles(body: &Value) -> Vec<String> {
    body["lessons"]
        .as_array()
        .expect("lessons is not an array")
        .iter()
        .map(|l| l["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn route_lessons_catalog_test() {
    let server = server_with_admin().await;

    Flow::new()
        .step(login_action("admin@example.com", PASSWORD).with_save_as("admin"))
        .step(register_action("learner@example.com", "Learner").with_save_as("learner"))
        // empty catalog
        .step(
            Action::new("list_empty", "GET", "/api/v1/lessons")
                .as_user("learner")
                .assert_body(|body| assert!(titles(body).is_empty())),
        )
        .step(
            create_lesson_action("Loops", "intermediate", 2)
                .as_user("admin")
                .assert_body(|body| {
                    assert_eq!(body["message"], "Lesson created successfully");
                })
                .with_save_as("loops"),
        )
        .step(
            create_lesson_action("Variables", "beginner", 1)
                .as_user("admin")
                .with_save_as("vars"),
        )
        // exactly the created lessons, in course order
        .step(
            Action::new("list", "GET", "/api/v1/lessons")
                .as_user("learner")
                .assert_body(|body| assert_eq!(titles(body), ["Variables", "Loops"])),
        )
        .step(
            Action::new("get", "GET", "")
                .with_dyn_path(lesson_path("loops", ""))
                .as_user("learner")
                .assert_body(|body| {
                    assert_eq!(body["lesson"]["title"], "Loops");
                    assert_eq!(body["lesson"]["difficulty"], "intermediate");
                    assert_eq!(body["lesson"]["content"], "# Loops");
                }),
        )
        .step(
            Action::new("get_unknown", "GET", &format!("/api/v1/lessons/{}", Uuid::new_v4()))
                .as_user("learner")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("get_not_uuid", "GET", "/api/v1/lessons/not-a-uuid")
                .as_user("learner")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&server)
        .await;
}

#[tokio::test]
async fn route_quiz_flow_test() {
    let server = server_with_admin().await;

    Flow::new()
        .step(login_action("admin@example.com", PASSWORD).with_save_as("admin"))
        .step(register_action("learner@example.com", "Learner").with_save_as("learner"))
        .step(
            create_lesson_action("Functions", "beginner", 1)
                .as_user("admin")
                .with_save_as("lesson"),
        )
        // no quiz yet
        .step(
            Action::new("quiz_missing", "GET", "")
                .with_dyn_path(lesson_path("lesson", "/quiz"))
                .as_user("learner")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("create_quiz", "POST", "")
                .with_dyn_path(admin_lesson_path("lesson", "/quiz"))
                .as_user("admin")
                .with_body(json!({
                    "title": "Functions quiz",
                    "questions": [{ "q": "What does def do?", "options": ["a", "b"] }],
                    "total_points": 10,
                })),
        )
        // one quiz per lesson
        .step(
            Action::new("create_quiz_again", "POST", "")
                .with_dyn_path(admin_lesson_path("lesson", "/quiz"))
                .as_user("admin")
                .with_body(json!({ "title": "Again", "questions": [] }))
                .with_expect(StatusCode::CONFLICT),
        )
        .step(
            Action::new("quiz", "GET", "")
                .with_dyn_path(lesson_path("lesson", "/quiz"))
                .as_user("learner")
                .assert_body(|body| {
                    assert_eq!(body["quiz"]["title"], "Functions quiz");
                    assert_eq!(body["quiz"]["total_points"], 10);
                    assert_eq!(body["quiz"]["questions"][0]["q"], "What does def do?");
                }),
        )
        // score above the maximum is clamped
        .step(
            Action::new("submit", "POST", "")
                .with_dyn_path(lesson_path("lesson", "/quiz/submit"))
                .as_user("learner")
                .with_body(json!({ "answers": { "0": "a" }, "score": 15 }))
                .assert_body(|body| {
                    assert_eq!(body["score"].as_f64(), Some(10.0));
                    assert_eq!(body["max_score"].as_f64(), Some(10.0));
                }),
        )
        .step(
            Action::new("submit_without_answers", "POST", "")
                .with_dyn_path(lesson_path("lesson", "/quiz/submit"))
                .as_user("learner")
                .with_body(json!({ "score": 5 }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("submissions", "GET", "/api/v1/quiz-submissions")
                .as_user("learner")
                .assert_body(|body| {
                    let submissions = body["submissions"].as_array().unwrap();
                    assert_eq!(submissions.len(), 1);
                    assert_eq!(submissions[0]["answers"]["0"], "a");
                }),
        )
        // other users don't see these submissions
        .step(
            Action::new("admin_submissions", "GET", "/api/v1/quiz-submissions")
                .as_user("admin")
                .assert_body(|body| assert!(body["submissions"].as_array().unwrap().is_empty())),
        )
        .run(&server)
        .await;
}

#[tokio::test]
async fn route_hints_test() {
    let server = server_with_admin().await;

    Flow::new()
        .step(login_action("admin@example.com", PASSWORD).with_save_as("admin"))
        .step(register_action("learner@example.com", "Learner").with_save_as("learner"))
        .step(
            create_lesson_action("Recursion", "advanced", 5)
                .as_user("admin")
                .with_save_as("lesson"),
        )
        .step(
            Action::new("hint_hard", "POST", "")
                .with_dyn_path(admin_lesson_path("lesson", "/hints"))
                .as_user("admin")
                .with_body(json!({ "hint_text": "Think about the base case", "difficulty_level": 3 })),
        )
        .step(
            Action::new("hint_easy", "POST", "")
                .with_dyn_path(admin_lesson_path("lesson", "/hints"))
                .as_user("admin")
                .with_body(json!({ "hint_text": "A function can call itself" })),
        )
        .step(
            Action::new("hint_out_of_range", "POST", "")
                .with_dyn_path(admin_lesson_path("lesson", "/hints"))
                .as_user("admin")
                .with_body(json!({ "hint_text": "Too hard", "difficulty_level": 9 }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("hints", "GET", "")
                .with_dyn_path(lesson_path("lesson", "/hints"))
                .as_user("learner")
                .assert_body(|body| {
                    let hints = body["hints"].as_array().unwrap();
                    assert_eq!(hints.len(), 2);
                    assert_eq!(hints[0]["difficulty_level"], 1);
                    assert_eq!(hints[1]["hint_text"], "Think about the base case");
                }),
        )
        .run(&server)
        .await;
}

#[tokio::test]
async fn route_progress_test() {
    let server = server_with_admin().await;

    Flow::new()
        .step(login_action("admin@example.com", PASSWORD).with_save_as("admin"))
        .step(register_action("learner@example.com", "Learner").with_save_as("learner"))
        .step(
            create_lesson_action("Strings", "beginner", 1)
                .as_user("admin")
                .with_save_as("lesson"),
        )
        .step(
            Action::new("progress_half", "POST", "")
                .with_dyn_path(lesson_path("lesson", "/progress"))
                .as_user("learner")
                .with_body(json!({ "completion_percentage": 50.0, "time_spent": 120 }))
                .assert_body(|body| {
                    assert_eq!(body["message"], "Progress updated successfully");
                    assert_eq!(body["progress"]["completed"], false);
                }),
        )
        // second update replaces the first record
        .step(
            Action::new("progress_done", "POST", "")
                .with_dyn_path(lesson_path("lesson", "/progress"))
                .as_user("learner")
                .with_body(json!({
                    "completed": true,
                    "completion_percentage": 100.0,
                    "time_spent": 300,
                })),
        )
        .step(
            Action::new("progress_invalid", "POST", "")
                .with_dyn_path(lesson_path("lesson", "/progress"))
                .as_user("learner")
                .with_body(json!({ "completion_percentage": 150.0 }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new(
                "progress_unknown_lesson",
                "POST",
                &format!("/api/v1/lessons/{}/progress", Uuid::new_v4()),
            )
            .as_user("learner")
            .with_body(json!({ "completion_percentage": 10.0 }))
            .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("progress_list", "GET", "/api/v1/progress")
                .as_user("learner")
                .assert_body(|body| {
                    let progress = body["progress"].as_array().unwrap();
                    assert_eq!(progress.len(), 1);
                    assert_eq!(progress[0]["completed"], true);
                    assert_eq!(progress[0]["time_spent"], 300);
                }),
        )
        // deleting the lesson takes the learner's progress with it
        .step(
            Action::new("delete_lesson", "DELETE", "")
                .with_dyn_path(admin_lesson_path("lesson", ""))
                .as_user("admin"),
        )
        .step(
            Action::new("progress_after_delete", "GET", "/api/v1/progress")
                .as_user("learner")
                .assert_body(|body| assert!(body["progress"].as_array().unwrap().is_empty())),
        )
        .step(
            Action::new("lesson_after_delete", "GET", "")
                .with_dyn_path(lesson_path("lesson", ""))
                .as_user("learner")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&server)
        .await;
}
