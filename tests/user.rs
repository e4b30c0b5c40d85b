mod common;
use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    Action, Flow, PASSWORD, ScriptedProvider, login_action, register_action, setup_server,
    setup_server_with, test_config,
};

#[tokio::test]
async fn route_register_test() {
    let server = setup_server().await;

    Flow::new()
        .step(
            register_action("ada@example.com", "Ada")
                .assert_body(|body| {
                    assert_eq!(body["message"], "User registered successfully");
                    assert_eq!(body["email"], "ada@example.com");
                    assert!(!body["token"].as_str().unwrap().is_empty());
                    assert!(body["expires_at"].is_string());
                })
                .with_save_as("ada"),
        )
        // the issued token is usable right away
        .step(
            Action::new("profile", "GET", "/api/v1/profile")
                .as_user("ada")
                .assert_body(|body| {
                    assert_eq!(body["email"], "ada@example.com");
                    assert_eq!(body["name"], "Ada");
                    assert_eq!(body["is_admin"], false);
                    assert!(body.get("password_hash").is_none());
                }),
        )
        // same email twice
        .step(register_action("ada@example.com", "Other").with_expect(StatusCode::CONFLICT))
        .run(&server)
        .await;
}

#[tokio::test]
async fn route_register_validation_test() {
    let server = setup_server().await;

    Flow::new()
        .step(
            Action::new("missing_fields", "POST", "/api/v1/register")
                .with_body(json!({ "email": "a@example.com" }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| {
                    assert_eq!(body["status_code"], "400");
                    assert!(body["details"].is_null());
                }),
        )
        .step(
            Action::new("bad_email", "POST", "/api/v1/register")
                .with_body(json!({
                    "email": "not-an-email",
                    "password": PASSWORD,
                    "name": "Bad",
                }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("short_password", "POST", "/api/v1/register")
                .with_body(json!({
                    "email": "short@example.com",
                    "password": "abc",
                    "name": "Short",
                }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&server)
        .await;
}

#[tokio::test]
async fn route_login_test() {
    let server = setup_server().await;

    Flow::new()
        .step(register_action("grace@example.com", "Grace").with_save_as("registered"))
        .step(
            login_action("grace@example.com", PASSWORD)
                .assert_body(|body| {
                    assert_eq!(body["message"], "Login successful");
                    assert_eq!(body["email"], "grace@example.com");
                })
                .with_save_as("grace"),
        )
        .step(Action::new("profile", "GET", "/api/v1/profile").as_user("grace"))
        // wrong credentials
        .step(
            login_action("grace@example.com", "WRONGPASSWORD")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        // unknown email answers exactly like a wrong password
        .step(
            login_action("nobody@example.com", PASSWORD)
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| {
                    assert_eq!(
                        body["message"],
                        "Authentication error, user not found or password is invalid."
                    );
                }),
        )
        .step(
            Action::new("login_missing_password", "POST", "/api/v1/login")
                .with_body(json!({ "email": "grace@example.com" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&server)
        .await;
}

#[tokio::test]
async fn login_reuses_live_session_test() {
    let server = setup_server().await;

    let ctx = Flow::new()
        .step(register_action("linus@example.com", "Linus").with_save_as("registered"))
        .step(login_action("linus@example.com", PASSWORD).with_save_as("first"))
        .step(login_action("linus@example.com", PASSWORD).with_save_as("second"))
        .run(&server)
        .await;

    assert_eq!(ctx.token("registered"), ctx.token("first"));
    assert_eq!(ctx.token("first"), ctx.token("second"));
}

#[tokio::test]
async fn route_profile_update_test() {
    let server = setup_server().await;

    Flow::new()
        .step(register_action("first@example.com", "First").with_save_as("first"))
        .step(register_action("second@example.com", "Second").with_save_as("second"))
        .step(
            Action::new("rename", "PUT", "/api/v1/profile")
                .as_user("first")
                .with_body(json!({ "name": "Renamed", "email": "renamed@example.com" }))
                .assert_body(|body| {
                    assert_eq!(body["name"], "Renamed");
                    assert_eq!(body["email"], "renamed@example.com");
                }),
        )
        // the old token still belongs to the same account
        .step(
            Action::new("profile", "GET", "/api/v1/profile")
                .as_user("first")
                .assert_body(|body| assert_eq!(body["email"], "renamed@example.com")),
        )
        .step(
            Action::new("taken_email", "PUT", "/api/v1/profile")
                .as_user("second")
                .with_body(json!({ "email": "renamed@example.com" }))
                .with_expect(StatusCode::CONFLICT),
        )
        .step(
            Action::new("invalid_email", "PUT", "/api/v1/profile")
                .as_user("second")
                .with_body(json!({ "email": "nope" }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("blank_name", "PUT", "/api/v1/profile")
                .as_user("second")
                .with_body(json!({ "name": "   " }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(login_action("renamed@example.com", PASSWORD))
        .run(&server)
        .await;
}

#[tokio::test]
async fn protected_route_requires_token_test() {
    let server = setup_server().await;

    Flow::new()
        .step(
            Action::new("no_token", "GET", "/api/v1/profile")
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert_eq!(body["status_code"], "401")),
        )
        .step(
            Action::new("garbage_token", "GET", "/api/v1/profile")
                .with_bearer("definitely.not.ajwt")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            Action::new("lessons_no_token", "GET", "/api/v1/lessons")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            Action::new("chat_no_token", "POST", "/api/v1/chat")
                .with_body(json!({ "message": "hi" }))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&server)
        .await;
}

#[tokio::test]
async fn token_signed_with_other_key_is_rejected_test() {
    let issuing = setup_server_with(
        test_config(&[("SECRET_KEY", "first-secret")]),
        ScriptedProvider::answering("ok"),
    )
    .await;
    let verifying = setup_server_with(
        test_config(&[("SECRET_KEY", "second-secret")]),
        ScriptedProvider::answering("ok"),
    )
    .await;

    let ctx = Flow::new()
        .step(register_action("eve@example.com", "Eve").with_save_as("eve"))
        .run(&issuing)
        .await;

    Flow::new()
        .step(
            Action::new("foreign_token", "GET", "/api/v1/profile")
                .with_bearer(&ctx.token("eve"))
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&verifying)
        .await;
}

#[tokio::test]
async fn expired_token_is_rejected_test() {
    let server = setup_server_with(
        test_config(&[("USER_TOKEN_LIFETIME_HOURS", "0")]),
        ScriptedProvider::answering("ok"),
    )
    .await;

    Flow::new()
        .step(register_action("old@example.com", "Old").with_save_as("old"))
        .step(
            Action::new("profile", "GET", "/api/v1/profile")
                .as_user("old")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&server)
        .await;
}

#[tokio::test]
async fn route_index_test() {
    let server = setup_server().await;

    Flow::new()
        .step(
            Action::new("index", "GET", "/api/v1/").assert_body(|body| {
                assert_eq!(body["message"], "Welcome to the Learning Platform API");
                assert_eq!(body["version"], "1.0.0");
            }),
        )
        .step(Action::new("index_no_slash", "GET", "/api/v1"))
        .run(&server)
        .await;
}

#[tokio::test]
async fn error_details_follow_each_servers_debug_flag_test() {
    let debug = setup_server_with(
        test_config(&[("DEBUG", "true")]),
        ScriptedProvider::answering("ok"),
    )
    .await;
    let quiet = setup_server().await;

    let missing_token = || {
        Action::new("profile", "GET", "/api/v1/profile").with_expect(StatusCode::UNAUTHORIZED)
    };

    // interleaved so one server's setting can't bleed into the other
    for _ in 0..2 {
        Flow::new()
            .step(missing_token().assert_body(|body| {
                assert_eq!(body["message"], "Authentication error, bearer token not found.");
                assert!(body["details"].as_str().unwrap().contains("AuthenticationTokenMissing"));
            }))
            .run(&debug)
            .await;

        Flow::new()
            .step(missing_token().assert_body(|body| {
                assert_eq!(body["status_code"], "401");
                assert!(body["details"].is_null());
            }))
            .run(&quiet)
            .await;
    }
}
