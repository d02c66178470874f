//! Project, board and task state endpoints.

use crate::in_memory::helpers::{
    ASSIGNEE, Client, EMPLOYEE, MANAGER, app, create_board, create_task, state_codes,
};
use axum::{
    Router,
    http::{Method, StatusCode},
};
use rstest::rstest;
use serde_json::{Value, json};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn health_reports_ok(app: Router) -> eyre::Result<()> {
    let reply = Client::anonymous(&app)
        .json(Method::GET, "/health", None)
        .await?;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({"status": "ok"}));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_board_carries_default_states(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;

    assert_eq!(
        state_codes(&board["states"]),
        ["NEW", "IN_PROGRESS", "REVIEW", "DONE"]
    );
    assert_eq!(board["active"], Value::Bool(true));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_listing_and_update(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let manager = Client::as_account(&app, MANAGER);
    let project_id = board["projectId"]
        .as_str()
        .ok_or_else(|| eyre::eyre!("board without project"))?;

    let updated = manager
        .json(
            Method::PUT,
            &format!("/projects/{project_id}"),
            Some(json!({"description": "Lunar landing"})),
        )
        .await?;
    let listed = manager
        .json(Method::GET, "/projects/organization/10", None)
        .await?;
    let boards = manager
        .json(Method::GET, &format!("/boards/project/{project_id}"), None)
        .await?;

    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["description"], json!("Lunar landing"));
    assert_eq!(updated.body["name"], json!("Apollo"));
    assert_eq!(listed.body.as_array().map(Vec::len), Some(1));
    assert_eq!(boards.body.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inserted_state_lands_after_its_predecessor(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default();
    let in_progress = board["states"][1]["id"].clone();
    let manager = Client::as_account(&app, MANAGER);

    let inserted = manager
        .json(
            Method::POST,
            &format!("/task-states/{board_id}"),
            Some(json!({"name": "Testing", "code": "TESTING", "prevStateId": in_progress})),
        )
        .await?;
    let states = manager
        .json(Method::GET, &format!("/boards/{board_id}/states"), None)
        .await?;

    assert_eq!(inserted.status, StatusCode::CREATED);
    assert_eq!(inserted.body["position"], json!(3));
    assert_eq!(
        state_codes(&states.body),
        ["NEW", "IN_PROGRESS", "TESTING", "REVIEW", "DONE"]
    );
    let positions: Vec<u64> = states
        .body
        .as_array()
        .map(|list| list.iter().filter_map(|s| s["position"].as_u64()).collect())
        .unwrap_or_default();
    assert_eq!(positions, [1, 2, 3, 4, 5]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn state_can_be_reordered_renamed_and_removed(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default();
    let review_id = board["states"][2]["id"].as_str().unwrap_or_default().to_owned();
    let new_id = board["states"][0]["id"].as_str().unwrap_or_default().to_owned();
    let manager = Client::as_account(&app, MANAGER);

    let swap = manager
        .json(
            Method::PUT,
            &format!("/task-states/{review_id}/move"),
            Some(json!({"direction": "UP"})),
        )
        .await?;
    let renamed = manager
        .json(
            Method::PUT,
            &format!("/task-states/{review_id}"),
            Some(json!({"name": "Peer review"})),
        )
        .await?;
    let removed = manager
        .json(Method::DELETE, &format!("/task-states/{new_id}"), None)
        .await?;
    let states = manager
        .json(Method::GET, &format!("/boards/{board_id}/states"), None)
        .await?;

    assert_eq!(swap.status, StatusCode::OK);
    assert_eq!(swap.body["moved"]["position"], json!(2));
    assert_eq!(swap.body["displaced"]["code"], json!("IN_PROGRESS"));
    assert_eq!(renamed.body["name"], json!("Peer review"));
    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    assert_eq!(state_codes(&states.body), ["REVIEW", "IN_PROGRESS", "DONE"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_board_reports_the_cascade(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default().to_owned();
    let report = create_task(&app, EMPLOYEE, &board_id, "Report").await?;
    create_task(&app, EMPLOYEE, &board_id, "Budget").await?;
    let manager = Client::as_account(&app, MANAGER);
    let assigned = manager
        .json(
            Method::POST,
            "/account-tasks",
            Some(json!({"accountId": ASSIGNEE, "taskId": report})),
        )
        .await?;
    let states = manager
        .json(Method::GET, &format!("/boards/{board_id}/states"), None)
        .await?;
    let first_state = states.text("/0/id")?;

    let deleted = manager
        .json(Method::DELETE, &format!("/boards/{board_id}"), None)
        .await?;
    let lookup = manager
        .json(Method::GET, &format!("/boards/{board_id}"), None)
        .await?;
    let state = manager
        .json(Method::GET, &format!("/task-states/{first_state}"), None)
        .await?;
    let assignments = manager
        .json(Method::GET, &format!("/account-tasks/{report}"), None)
        .await?;

    assert_eq!(assigned.status, StatusCode::CREATED);
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(
        deleted.body,
        json!({"boards": 1, "tasks": 2, "assignments": 1})
    );
    assert_eq!(lookup.status, StatusCode::NOT_FOUND);
    assert_eq!(state.status, StatusCode::OK);
    assert_eq!(state.body["code"], json!("NEW"));
    assert_eq!(assignments.status, StatusCode::OK);
    assert_eq!(assignments.body, json!([]));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn global_listings_cover_every_live_row(app: Router) -> eyre::Result<()> {
    let board = create_board(&app).await?;
    let board_id = board["id"].as_str().unwrap_or_default().to_owned();
    let project_id = board["projectId"].as_str().unwrap_or_default().to_owned();
    let manager = Client::as_account(&app, MANAGER);
    let archive = manager
        .json(
            Method::POST,
            "/boards",
            Some(json!({"name": "archive", "title": "Archive", "projectId": project_id})),
        )
        .await?;
    let archive_id = archive.text("/id")?;

    let states = manager.json(Method::GET, "/task-states", None).await?;
    manager
        .json(Method::DELETE, &format!("/boards/{archive_id}"), None)
        .await?;
    let projects = manager.json(Method::GET, "/projects", None).await?;
    let boards = manager.json(Method::GET, "/boards", None).await?;

    assert_eq!(projects.status, StatusCode::OK);
    assert_eq!(projects.body.as_array().map(Vec::len), Some(1));
    assert_eq!(projects.body[0]["id"], json!(project_id));
    assert_eq!(boards.status, StatusCode::OK);
    assert_eq!(boards.body.as_array().map(Vec::len), Some(1));
    assert_eq!(boards.body[0]["id"], json!(board_id));
    assert_eq!(states.status, StatusCode::OK);
    assert_eq!(state_codes(&states.body).len(), 8);
    for owner in [&board_id, &archive_id] {
        let on_board: Vec<Value> = states
            .body
            .as_array()
            .into_iter()
            .flatten()
            .filter(|state| state["boardId"] == json!(owner))
            .cloned()
            .collect();
        assert_eq!(
            state_codes(&Value::Array(on_board)),
            ["NEW", "IN_PROGRESS", "REVIEW", "DONE"]
        );
    }
    Ok(())
}
