mod common;
use std::time::Duration;

use codecamp::spawn_session_cleanup;
use tokio_util::sync::CancellationToken;

use crate::common::{Flow, ScriptedProvider, register_action, setup_server_with, test_config};

async fn session_count(server: &common::FlowServer) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(server.state.pool().executor())
        .await
        .unwrap()
}

#[tokio::test]
async fn cleanup_task_sweeps_expired_sessions_test() {
    let server = setup_server_with(
        test_config(&[
            ("USER_TOKEN_LIFETIME_HOURS", "0"),
            ("SESSION_CLEANUP_INTERVAL_SECS", "1"),
        ]),
        ScriptedProvider::answering("ok"),
    )
    .await;

    Flow::new()
        .step(register_action("gone@example.com", "Gone"))
        .step(register_action("also-gone@example.com", "Also Gone"))
        .run(&server)
        .await;
    assert_eq!(session_count(&server).await, 2);

    let cancel = CancellationToken::new();
    let task = spawn_session_cleanup(server.state.clone(), cancel.clone());

    // the first sweep runs as soon as the task starts
    let mut remaining = session_count(&server).await;
    for _ in 0..100 {
        if remaining == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        remaining = session_count(&server).await;
    }
    assert_eq!(remaining, 0);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("cleanup task did not stop")
        .unwrap();
}

#[tokio::test]
async fn cleanup_task_keeps_live_sessions_test() {
    let server = setup_server_with(
        test_config(&[("SESSION_CLEANUP_INTERVAL_SECS", "1")]),
        ScriptedProvider::answering("ok"),
    )
    .await;

    Flow::new()
        .step(register_action("live@example.com", "Live"))
        .run(&server)
        .await;

    let cancel = CancellationToken::new();
    let task = spawn_session_cleanup(server.state.clone(), cancel.clone());
    tokio::time::sleep(Duration::from_millis(200)).await;
    cancel.cancel();
    task.await.unwrap();

    assert_eq!(session_count(&server).await, 1);
}
