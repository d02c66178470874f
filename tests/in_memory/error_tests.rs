//! Error envelope and status mapping.

use crate::in_memory::helpers::{Client, EMPLOYEE, MANAGER, app, create_board, create_task};
use axum::{
    Router,
    http::{Method, StatusCode},
};
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

fn code(body: &Value) -> Option<&str> {
    body.pointer("/error/code").and_then(Value::as_str)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mutation_without_caller_is_unauthorized(app: Router) -> eyre::Result<()> {
    let reply = Client::anonymous(&app)
        .json(Method::POST, "/projects", Some(json!({"name": "Apollo"})))
        .await?;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(code(&reply.body), Some("MISSING_CALLER"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn employee_cannot_create_projects(app: Router) -> eyre::Result<()> {
    let reply = Client::as_account(&app, EMPLOYEE)
        .json(Method::POST, "/projects", Some(json!({"name": "Apollo"})))
        .await?;

    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(code(&reply.body), Some("INSUFFICIENT_POSITION"));
    assert_eq!(reply.body["error"]["kind"], json!("forbidden"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_board_is_not_found(app: Router) -> eyre::Result<()> {
    let reply = Client::as_account(&app, MANAGER)
        .json(Method::GET, &format!("/boards/{}", Uuid::new_v4()), None)
        .await?;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(code(&reply.body), Some("BOARD_NOT_FOUND"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_back_from_first_state_is_a_bad_request(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default().to_owned();
    let task_id = create_task(&app, EMPLOYEE, &board_id, "Report").await?;

    let reply = Client::as_account(&app, EMPLOYEE)
        .json(
            Method::PUT,
            &format!("/tasks/{task_id}/move"),
            Some(json!({"direction": "BACKWARD"})),
        )
        .await?;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(code(&reply.body), Some("MOVE_OUT_OF_BOUNDS"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_names_conflict(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default().to_owned();
    let manager = Client::as_account(&app, MANAGER);
    create_task(&app, EMPLOYEE, &board_id, "Report").await?;

    let board_again = manager
        .json(
            Method::POST,
            "/boards",
            Some(json!({"name": "main", "title": "Again", "projectId": board["projectId"]})),
        )
        .await?;
    let task_again = Client::as_account(&app, EMPLOYEE)
        .json(
            Method::POST,
            "/tasks",
            Some(json!({
                "boardId": board_id,
                "name": "Report",
                "description": "Duplicate",
                "dueDate": "2026-12-31",
                "priority": 2,
            })),
        )
        .await?;

    assert_eq!(board_again.status, StatusCode::CONFLICT);
    assert_eq!(code(&board_again.body), Some("BOARD_ALREADY_EXISTS"));
    assert_eq!(task_again.status, StatusCode::CONFLICT);
    assert_eq!(code(&task_again.body), Some("TASK_ALREADY_EXISTS"));
    Ok(())
}

#[rstest]
#[case(0)]
#[case(6)]
#[tokio::test(flavor = "multi_thread")]
async fn out_of_range_priority_is_rejected(app: Router, #[case] priority: i32) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default().to_owned();

    let reply = Client::as_account(&app, EMPLOYEE)
        .json(
            Method::POST,
            "/tasks",
            Some(json!({
                "boardId": board_id,
                "name": "Report",
                "description": "Out of range",
                "dueDate": "2026-12-31",
                "priority": priority,
            })),
        )
        .await?;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(code(&reply.body), Some("INVALID_BODY"));
    assert_eq!(reply.body["error"]["kind"], json!("bad_request"));
    assert!(reply.text("/error/message")?.contains("invalid priority"));
    Ok(())
}

#[rstest]
#[case(Some(json!({"description": "no name"})))]
#[case(Some(json!(["Apollo"])))]
#[case(None)]
#[tokio::test(flavor = "multi_thread")]
async fn unusable_body_answers_with_the_error_envelope(
    app: Router,
    #[case] body: Option<Value>,
) -> eyre::Result<()> {
    let reply = Client::as_account(&app, MANAGER)
        .json(Method::POST, "/projects", body)
        .await?;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(code(&reply.body), Some("INVALID_BODY"));
    Ok(())
}
