mod common;

use std::sync::Arc;

use taskboard_lib::client::{
    AuthState, BoardFilters, ClientError, Notification, RecordingNotifier, SessionStore, TaskBoard,
};
use taskboard_lib::commands::CreateTaskRequest;
use taskboard_lib::db::TaskStatus;

use common::{create, spawn_server, TestUser};

fn is_error(notification: &Notification, prefix: &str) -> bool {
    matches!(notification, Notification::Error(message) if message.starts_with(prefix))
}

#[tokio::test]
async fn check_auth_signs_in_from_stored_session() {
    let server = spawn_server().await;
    let alice = server.user("alice").await;
    let mut board = server.board(&alice, Arc::new(RecordingNotifier::new()));

    match board.check_auth().await {
        AuthState::SignedIn(user) => assert_eq!(user.username, "alice"),
        AuthState::SignedOut => panic!("expected to be signed in"),
    }
}

#[tokio::test]
async fn mutations_refresh_the_list() {
    let server = spawn_server().await;
    let alice = server.user("alice").await;
    let notifier = Arc::new(RecordingNotifier::new());
    let mut board = server.board(&alice, notifier.clone());
    board.check_auth().await;

    let first = board
        .create_task(&CreateTaskRequest::new("First"))
        .await
        .unwrap();
    let second = board
        .create_task(&CreateTaskRequest::new("Second"))
        .await
        .unwrap();
    let titles: Vec<&str> = board.tasks().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Second", "First"]);
    assert_eq!(board.pagination().unwrap().total, 2);

    board
        .update_status(&first.id, TaskStatus::InProgress)
        .await
        .unwrap();
    board.complete_task(&second.id).await.unwrap();
    let stats = board.stats();
    assert_eq!((stats.total, stats.in_progress, stats.completed), (2, 1, 1));

    board.delete_task(&first.id).await.unwrap();
    assert_eq!(board.tasks().len(), 1);

    assert_eq!(
        notifier.take(),
        vec![
            Notification::Success("Task created successfully!".into()),
            Notification::Success("Task created successfully!".into()),
            Notification::Success("Task status updated!".into()),
            Notification::Success("Task marked as completed!".into()),
            Notification::Success("Task deleted successfully!".into()),
        ]
    );
}

#[tokio::test]
async fn failed_mutation_keeps_state_and_notifies() {
    let server = spawn_server().await;
    let alice = server.user("alice").await;
    let notifier = Arc::new(RecordingNotifier::new());
    let mut board = server.board(&alice, notifier.clone());
    board.check_auth().await;

    create(board.api(), "Keep me").await;
    board.refresh().await.unwrap();
    let before = board.tasks().to_vec();
    assert_eq!(before.len(), 1);

    let err = board.delete_task("missing-id").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    let err = board
        .create_task(&CreateTaskRequest::new("x".repeat(101)))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));

    assert_eq!(board.tasks(), before.as_slice());
    assert!(matches!(board.auth(), AuthState::SignedIn(_)));
    let notes = notifier.take();
    assert_eq!(notes.len(), 2);
    assert!(is_error(&notes[0], "Failed to delete task"));
    assert!(is_error(&notes[1], "Failed to create task"));
}

#[tokio::test]
async fn rejected_token_clears_the_session() {
    let server = spawn_server().await;
    let ghost = TestUser {
        id: 0,
        token: "revoked-token".into(),
    };
    let notifier = Arc::new(RecordingNotifier::new());
    let mut board = server.board(&ghost, notifier.clone());
    let session_path = server.dir.path().join("session-0.json");
    assert!(session_path.exists());

    let err = board
        .create_task(&CreateTaskRequest::new("Never stored"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
    assert_eq!(board.auth(), &AuthState::SignedOut);
    assert!(board.api().token().is_none());
    assert!(!session_path.exists());
    assert!(is_error(&notifier.take()[0], "Failed to create task"));

    // 会话已清除，后续调用不再发请求
    let err = board.refresh().await.unwrap_err();
    assert!(matches!(err, ClientError::SignedOut));
}

#[tokio::test]
async fn check_auth_with_bad_token_signs_out() {
    let server = spawn_server().await;
    let ghost = TestUser {
        id: 0,
        token: "bogus".into(),
    };
    let mut board = server.board(&ghost, Arc::new(RecordingNotifier::new()));
    assert_eq!(board.check_auth().await, &AuthState::SignedOut);
    assert!(!server.dir.path().join("session-0.json").exists());
}

#[tokio::test]
async fn sign_in_persists_and_sign_out_forgets() {
    let server = spawn_server().await;
    let alice = server.user("alice").await;
    let store = SessionStore::new(server.dir.path().join("fresh-session.json"));
    let notifier = Arc::new(RecordingNotifier::new());
    let mut board = TaskBoard::open(store.clone(), notifier.clone()).unwrap();
    assert_eq!(board.auth(), &AuthState::SignedOut);

    assert!(board.sign_in(&server.base_url, "wrong").await.is_err());
    assert_eq!(store.load().unwrap(), None);

    let user = board.sign_in(&server.base_url, &alice.token).await.unwrap();
    assert_eq!(user.id, alice.id);
    let saved = store.load().unwrap().unwrap();
    assert_eq!(saved.token, alice.token);
    assert_eq!(saved.base_url, server.base_url);

    // 重新打开时从会话文件恢复
    let mut reopened = TaskBoard::open(store.clone(), notifier.clone()).unwrap();
    assert!(matches!(reopened.check_auth().await, AuthState::SignedIn(_)));

    board.sign_out().unwrap();
    assert_eq!(board.auth(), &AuthState::SignedOut);
    assert_eq!(store.load().unwrap(), None);

    let notes = notifier.take();
    assert!(matches!(notes.first(), Some(Notification::Error(_))));
    assert_eq!(
        notes.last(),
        Some(&Notification::Success("Logged out successfully!".into()))
    );
}

#[tokio::test]
async fn filters_drive_the_list() {
    let server = spawn_server().await;
    let alice = server.user("alice").await;
    let mut board = server.board(&alice, Arc::new(RecordingNotifier::new()));
    board.check_auth().await;

    for i in 0..12 {
        create(board.api(), &format!("item {i}")).await;
    }
    let done = create(board.api(), "finished").await;
    board.api().complete_task(&done.id).await.unwrap();

    board
        .set_filters(BoardFilters {
            status: Some(TaskStatus::Pending),
            limit: Some(5),
            ..BoardFilters::default()
        })
        .await
        .unwrap();
    assert_eq!(board.tasks().len(), 5);
    let pagination = board.pagination().unwrap();
    assert_eq!((pagination.total, pagination.pages), (12, 3));

    board.set_page(3).await.unwrap();
    assert_eq!(board.tasks().len(), 2);
    assert_eq!(board.filters().page, Some(3));
}
