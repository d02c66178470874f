//! Task, assignment and history endpoints.

use crate::in_memory::helpers::{ASSIGNEE, Client, EMPLOYEE, MANAGER, app, create_board, create_task};
use axum::{
    Router,
    http::{Method, StatusCode},
};
use rstest::rstest;
use serde_json::{Value, json};

fn action_types(history: &Value) -> Vec<String> {
    history
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|action| action["actionType"].as_str())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_moves_through_the_board(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default().to_owned();
    let done_id = board["states"][3]["id"].clone();
    let task_id = create_task(&app, EMPLOYEE, &board_id, "Report").await?;
    let owner = Client::as_account(&app, EMPLOYEE);

    let forward = owner
        .json(
            Method::PUT,
            &format!("/tasks/{task_id}/move"),
            Some(json!({"direction": "FORWARD"})),
        )
        .await?;
    let jumped = owner
        .json(
            Method::PUT,
            &format!("/tasks/{task_id}/state"),
            Some(json!({"code": "DONE"})),
        )
        .await?;
    let history = owner
        .json(Method::GET, &format!("/tasks/{task_id}/actions"), None)
        .await?;

    assert_eq!(forward.status, StatusCode::OK);
    assert_eq!(jumped.body["stateId"], done_id);
    assert_eq!(
        action_types(&history.body),
        ["CREATED", "MOVED_FORWARD", "MOVED_FORWARD"]
    );
    assert_eq!(history.body[2]["oldValue"], json!("IN_PROGRESS"));
    assert_eq!(history.body[2]["newValue"], json!("DONE"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn partial_update_changes_only_given_fields(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default().to_owned();
    let task_id = create_task(&app, EMPLOYEE, &board_id, "Report").await?;
    let owner = Client::as_account(&app, EMPLOYEE);

    let updated = owner
        .json(
            Method::PUT,
            &format!("/tasks/{task_id}"),
            Some(json!({"dueDate": "2027-01-15"})),
        )
        .await?;

    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["dueDate"], json!("2027-01-15"));
    assert_eq!(updated.body["name"], json!("Report"));
    assert_eq!(updated.body["priority"], json!(3));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assignee_gains_state_change_permission(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default().to_owned();
    let task_id = create_task(&app, MANAGER, &board_id, "Report").await?;
    let manager = Client::as_account(&app, MANAGER);
    let assignee = Client::as_account(&app, ASSIGNEE);
    let change = json!({"code": "REVIEW"});

    let refused = assignee
        .json(Method::PUT, &format!("/tasks/{task_id}/state"), Some(change.clone()))
        .await?;
    let assigned = manager
        .json(
            Method::POST,
            "/account-tasks",
            Some(json!({"accountId": ASSIGNEE, "taskId": task_id})),
        )
        .await?;
    let accepted = assignee
        .json(Method::PUT, &format!("/tasks/{task_id}/state"), Some(change))
        .await?;
    let task = manager
        .json(Method::GET, &format!("/tasks/{task_id}"), None)
        .await?;

    assert_eq!(refused.status, StatusCode::FORBIDDEN);
    assert_eq!(refused.body["error"]["code"], json!("NOT_OWNER_OR_ASSIGNEE"));
    assert_eq!(assigned.status, StatusCode::CREATED);
    assert_eq!(accepted.status, StatusCode::OK);
    assert_eq!(task.body["assignees"], json!([ASSIGNEE]));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unassign_removes_the_account(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default().to_owned();
    let task_id = create_task(&app, MANAGER, &board_id, "Report").await?;
    let manager = Client::as_account(&app, MANAGER);
    manager
        .json(
            Method::POST,
            "/account-tasks",
            Some(json!({"accountId": ASSIGNEE, "taskId": task_id})),
        )
        .await?;

    let removed = manager
        .json(
            Method::DELETE,
            &format!("/account-tasks/{task_id}/{ASSIGNEE}"),
            None,
        )
        .await?;
    let again = manager
        .json(
            Method::DELETE,
            &format!("/account-tasks/{task_id}/{ASSIGNEE}"),
            None,
        )
        .await?;
    let listed = manager
        .json(Method::GET, &format!("/account-tasks/{task_id}"), None)
        .await?;

    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(listed.body, json!([]));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_task_disappears_from_board_listing(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default().to_owned();
    let task_id = create_task(&app, EMPLOYEE, &board_id, "Report").await?;
    create_task(&app, EMPLOYEE, &board_id, "Budget").await?;
    let owner = Client::as_account(&app, EMPLOYEE);

    let deleted = owner
        .json(Method::DELETE, &format!("/tasks/{task_id}"), None)
        .await?;
    let listed = owner
        .json(Method::GET, &format!("/tasks/board/{board_id}"), None)
        .await?;
    let history = owner
        .json(Method::GET, &format!("/tasks/{task_id}/actions"), None)
        .await?;

    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let names: Vec<&str> = listed
        .body
        .as_array()
        .map(|list| list.iter().filter_map(|task| task["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, ["Budget"]);
    assert_eq!(action_types(&history.body), ["CREATED", "DELETED"]);
    Ok(())
}
