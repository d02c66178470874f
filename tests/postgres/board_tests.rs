//! Board, state ordering and cascade persistence.

use crate::postgres::helpers::{
    ASSIGNEE, BoxError, MANAGER, PgWorkflow, caller, codes, draft, pg_workflow, positions,
};
use rstest::rstest;
use taskboard::workflow::{
    domain::{Conflict, EntityRef, ReorderDirection, WorkflowDomainError},
    ports::{
        AssignmentRepository, BoardRepository, TaskRepository, TaskStateRepository, Visibility,
    },
    services::{TaskStateChanges, WorkflowError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn board_creation_persists_default_states(
    pg_workflow: Result<Option<PgWorkflow>, BoxError>,
) -> Result<(), BoxError> {
    let Some(workflow) = pg_workflow? else {
        return Ok(());
    };
    let (_, board, _) = workflow.board().await?;

    let ordering = workflow.boards.states(board.id()).await?;

    assert_eq!(codes(ordering.states()), ["NEW", "IN_PROGRESS", "REVIEW", "DONE"]);
    assert_eq!(positions(ordering.states()), [1, 2, 3, 4]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn state_edits_keep_positions_contiguous(
    pg_workflow: Result<Option<PgWorkflow>, BoxError>,
) -> Result<(), BoxError> {
    let Some(workflow) = pg_workflow? else {
        return Ok(());
    };
    let (_, board, seeded) = workflow.board().await?;
    let manager = caller(MANAGER);
    let in_progress = seeded
        .iter()
        .find(|state| state.code() == "IN_PROGRESS")
        .ok_or("seeded IN_PROGRESS state")?;
    let first = seeded.first().ok_or("seeded NEW state")?;

    let testing = workflow
        .states
        .insert(&manager, board.id(), "Testing", "TESTING", Some(in_progress.id()))
        .await?;
    let swap = workflow
        .states
        .reorder(&manager, testing.id(), ReorderDirection::Up)
        .await?;
    workflow.states.remove(&manager, first.id()).await?;
    let ordering = workflow.boards.states(board.id()).await?;

    assert_eq!(testing.position().value(), 3);
    assert_eq!(swap.moved.position().value(), 2);
    assert_eq!(swap.displaced.code(), "IN_PROGRESS");
    assert_eq!(codes(ordering.states()), ["TESTING", "IN_PROGRESS", "REVIEW", "DONE"]);
    assert!(ordering.positions_are_contiguous());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_state_code_is_a_conflict(
    pg_workflow: Result<Option<PgWorkflow>, BoxError>,
) -> Result<(), BoxError> {
    let Some(workflow) = pg_workflow? else {
        return Ok(());
    };
    let (_, board, seeded) = workflow.board().await?;
    let review = seeded
        .iter()
        .find(|state| state.code() == "REVIEW")
        .ok_or("seeded REVIEW state")?;

    let result = workflow
        .states
        .update(
            &caller(MANAGER),
            review.id(),
            &TaskStateChanges {
                name: None,
                code: Some("DONE".to_owned()),
            },
        )
        .await;
    let ordering = workflow.boards.states(board.id()).await?;

    assert!(matches!(
        result,
        Err(WorkflowError::Domain(WorkflowDomainError::Conflict(
            Conflict::StateCode(_)
        )))
    ));
    assert_eq!(codes(ordering.states()), ["NEW", "IN_PROGRESS", "REVIEW", "DONE"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_delete_trashes_boards_tasks_and_assignments_but_keeps_states(
    pg_workflow: Result<Option<PgWorkflow>, BoxError>,
) -> Result<(), BoxError> {
    let Some(workflow) = pg_workflow? else {
        return Ok(());
    };
    let (project, board, seeded) = workflow.board().await?;
    let task = workflow
        .tasks
        .create(&caller(MANAGER), draft(board.id(), "Report")?)
        .await?;
    let assignment = workflow
        .assignments
        .assign(&caller(MANAGER), task.id(), ASSIGNEE)
        .await?;

    let summary = workflow.projects.delete(&caller(MANAGER), project.id()).await?;
    let board_lookup = workflow.boards.get(board.id()).await;
    let archived_board = workflow
        .repository
        .find_board(board.id(), Visibility::IncludeArchived)
        .await?;
    let archived_task = workflow
        .repository
        .find_task(task.id(), Visibility::IncludeArchived)
        .await?;
    let archived_assignment = workflow
        .repository
        .find_assignment(assignment.id(), Visibility::IncludeArchived)
        .await?;
    let mut surviving_states = Vec::new();
    for state in &seeded {
        surviving_states.push(
            workflow
                .repository
                .find_task_state(state.id(), Visibility::IncludeArchived)
                .await?,
        );
    }

    assert_eq!((summary.boards, summary.tasks, summary.assignments), (1, 1, 1));
    assert!(matches!(
        board_lookup,
        Err(WorkflowError::NotFound(EntityRef::Board(_)))
    ));
    assert!(archived_board.is_some_and(|found| found.is_deleted()));
    assert!(archived_task.is_some_and(|found| found.is_deleted()));
    assert!(archived_assignment.is_some_and(|found| found.is_deleted()));
    assert_eq!(surviving_states.len(), 4);
    assert!(
        surviving_states
            .iter()
            .all(|state| state.as_ref().is_some_and(|found| !found.is_deleted()))
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn global_listings_skip_trashed_rows(
    pg_workflow: Result<Option<PgWorkflow>, BoxError>,
) -> Result<(), BoxError> {
    let Some(workflow) = pg_workflow? else {
        return Ok(());
    };
    let (project, board, seeded) = workflow.board().await?;
    let (archive, _) = workflow
        .boards
        .create(&caller(MANAGER), project.id(), "archive", "Archive")
        .await?;
    workflow.boards.delete(&caller(MANAGER), archive.id()).await?;
    let review = seeded
        .iter()
        .find(|state| state.code() == "REVIEW")
        .ok_or("seeded REVIEW state")?;
    workflow.states.remove(&caller(MANAGER), review.id()).await?;

    let projects = workflow.projects.list_all().await?;
    let boards = workflow.boards.list_all().await?;
    let states = workflow.states.list_all().await?;
    let on_board: Vec<_> = states
        .into_iter()
        .filter(|state| state.board_id() == board.id())
        .collect();

    assert_eq!(projects.iter().map(|found| found.id()).collect::<Vec<_>>(), [project.id()]);
    assert_eq!(boards.iter().map(|found| found.id()).collect::<Vec<_>>(), [board.id()]);
    assert_eq!(codes(&on_board), ["NEW", "IN_PROGRESS", "DONE"]);
    assert_eq!(positions(&on_board), [1, 2, 3]);
    Ok(())
}
