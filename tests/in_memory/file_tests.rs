//! Task file endpoints.

use crate::in_memory::helpers::{Client, EMPLOYEE, app, create_board, create_task};
use axum::{
    Router,
    http::{Method, StatusCode},
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn uploaded_files_are_listed_and_removed_together(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default().to_owned();
    let task_id = create_task(&app, EMPLOYEE, &board_id, "Report").await?;
    let owner = Client::as_account(&app, EMPLOYEE);

    let first = owner
        .upload(&format!("/tasks/files/{task_id}"), "minutes.pdf", b"%PDF-1.7")
        .await?;
    owner
        .upload(&format!("/tasks/files/{task_id}"), "chart.png", b"\x89PNG")
        .await?;
    let listed = owner
        .json(Method::GET, &format!("/tasks/files/task/{task_id}"), None)
        .await?;
    let cleared = owner
        .json(Method::DELETE, &format!("/tasks/files/task/{task_id}"), None)
        .await?;
    let after = owner
        .json(Method::GET, &format!("/tasks/files/task/{task_id}"), None)
        .await?;

    assert_eq!(first.status, StatusCode::CREATED);
    assert!(first.text("/keyName")?.ends_with(".pdf"));
    assert_eq!(listed.body.as_array().map(Vec::len), Some(2));
    assert_eq!(cleared.body, json!({"removed": 2}));
    assert_eq!(after.body, json!([]));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn file_can_be_removed_by_key(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default().to_owned();
    let task_id = create_task(&app, EMPLOYEE, &board_id, "Report").await?;
    let owner = Client::as_account(&app, EMPLOYEE);
    let uploaded = owner
        .upload(&format!("/tasks/files/{task_id}"), "notes.txt", b"draft")
        .await?;
    let key = uploaded.text("/keyName")?;

    let removed = owner
        .json(
            Method::DELETE,
            &format!("/tasks/files/by-key?keyName={key}&taskId={task_id}"),
            None,
        )
        .await?;
    let repeated = owner
        .json(
            Method::DELETE,
            &format!("/tasks/files/by-key?keyName={key}&taskId={task_id}"),
            None,
        )
        .await?;

    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    assert_eq!(repeated.status, StatusCode::NOT_FOUND);
    assert_eq!(repeated.body["error"]["code"], json!("TASK_FILE_NOT_FOUND"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn file_can_be_removed_by_id(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default().to_owned();
    let task_id = create_task(&app, EMPLOYEE, &board_id, "Report").await?;
    let owner = Client::as_account(&app, EMPLOYEE);
    let uploaded = owner
        .upload(&format!("/tasks/files/{task_id}"), "notes.txt", b"draft")
        .await?;
    let file_id = uploaded.text("/id")?;

    let removed = owner
        .json(
            Method::DELETE,
            &format!("/tasks/files/{file_id}/task/{task_id}"),
            None,
        )
        .await?;
    let history = owner
        .json(Method::GET, &format!("/tasks/{task_id}/actions"), None)
        .await?;

    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    assert_eq!(history.body[1]["actionType"], json!("FILE_UPLOADED"));
    assert_eq!(history.body[2]["actionType"], json!("FILE_DELETED"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn upload_without_file_name_is_rejected(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default().to_owned();
    let task_id = create_task(&app, EMPLOYEE, &board_id, "Report").await?;

    let reply = Client::as_account(&app, EMPLOYEE)
        .upload(&format!("/tasks/files/{task_id}"), " ", b"draft")
        .await?;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"]["code"], json!("INVALID_HEADER"));
    Ok(())
}
