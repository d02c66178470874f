//! Task lifecycle, audit log and notification outbox persistence.

use crate::postgres::helpers::{
    ASSIGNEE, BoxError, EMPLOYEE, MANAGER, PgWorkflow, caller, draft, pg_workflow,
};
use chrono::Utc;
use rstest::rstest;
use taskboard::workflow::{
    domain::{Conflict, MoveDirection, Priority, TaskActionType, TaskChanges, WorkflowDomainError},
    ports::{AssignmentRepository, TaskActionRepository},
    services::WorkflowError,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lifecycle_is_recorded_in_order(
    pg_workflow: Result<Option<PgWorkflow>, BoxError>,
) -> Result<(), BoxError> {
    let Some(workflow) = pg_workflow? else {
        return Ok(());
    };
    let (_, board, _) = workflow.board().await?;
    let owner = caller(MANAGER);
    let task = workflow.tasks.create(&owner, draft(board.id(), "Report")?).await?;

    workflow.assignments.assign(&owner, task.id(), ASSIGNEE).await?;
    workflow
        .tasks
        .move_task(&owner, task.id(), MoveDirection::Forward)
        .await?;
    let moved = workflow
        .tasks
        .change_state_by_code(&caller(ASSIGNEE), task.id(), "DONE")
        .await?;
    let history = workflow.tasks.history(task.id()).await?;
    let view = workflow.tasks.get(task.id()).await?;

    let kinds: Vec<TaskActionType> = history.iter().map(|action| action.action_type()).collect();
    assert_eq!(
        kinds,
        [
            TaskActionType::Created,
            TaskActionType::Assigned,
            TaskActionType::MovedForward,
            TaskActionType::MovedForward,
        ]
    );
    let last = history.last().ok_or("history is empty")?;
    assert_eq!(last.old_value(), Some("IN_PROGRESS"));
    assert_eq!(last.new_value(), Some("DONE"));
    assert_eq!(view.task.state_id(), moved.state_id());
    assert_eq!(view.assignees, [ASSIGNEE]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outbox_tracks_delivery_and_failures(
    pg_workflow: Result<Option<PgWorkflow>, BoxError>,
) -> Result<(), BoxError> {
    let Some(workflow) = pg_workflow? else {
        return Ok(());
    };
    let (_, board, _) = workflow.board().await?;
    let owner = caller(EMPLOYEE);
    let task = workflow.tasks.create(&owner, draft(board.id(), "Report")?).await?;
    workflow
        .tasks
        .move_task(&owner, task.id(), MoveDirection::Forward)
        .await?;

    let pending = workflow.repository.pending_notifications(10, 2).await?;
    let created = pending.first().ok_or("no pending notification")?;
    let forward = pending.get(1).ok_or("second notification missing")?;
    workflow
        .repository
        .mark_notification_dispatched(created.action.id(), Utc::now())
        .await?;
    workflow
        .repository
        .record_notification_failure(forward.action.id(), "channel down", Utc::now())
        .await?;
    let retry = workflow.repository.pending_notifications(10, 2).await?;
    workflow
        .repository
        .record_notification_failure(forward.action.id(), "channel down", Utc::now())
        .await?;
    let exhausted = workflow.repository.pending_notifications(10, 2).await?;

    assert_eq!(pending.len(), 2);
    assert_eq!(created.action.action_type(), TaskActionType::Created);
    assert_eq!(created.attempts, 0);
    assert_eq!(retry.len(), 1);
    assert_eq!(retry.first().map(|entry| entry.attempts), Some(1));
    assert!(exhausted.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_writes_one_record_per_field(
    pg_workflow: Result<Option<PgWorkflow>, BoxError>,
) -> Result<(), BoxError> {
    let Some(workflow) = pg_workflow? else {
        return Ok(());
    };
    let (_, board, _) = workflow.board().await?;
    let owner = caller(EMPLOYEE);
    let task = workflow.tasks.create(&owner, draft(board.id(), "Report")?).await?;

    let updated = workflow
        .tasks
        .update(
            &owner,
            task.id(),
            &TaskChanges {
                name: Some("Annual report".to_owned()),
                priority: Some(Priority::new(1)?),
                ..TaskChanges::default()
            },
        )
        .await?;
    let history = workflow.tasks.history(task.id()).await?;

    assert_eq!(updated.name(), "Annual report");
    let mut updates: Vec<(Option<&str>, Option<&str>)> = history
        .iter()
        .filter(|action| action.action_type() == TaskActionType::Updated)
        .map(|action| (action.old_value(), action.new_value()))
        .collect();
    updates.sort_unstable();
    assert_eq!(
        updates,
        [
            (Some("name:Report"), Some("name:Annual report")),
            (Some("priority:3"), Some("priority:1")),
        ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_task_name_is_a_conflict(
    pg_workflow: Result<Option<PgWorkflow>, BoxError>,
) -> Result<(), BoxError> {
    let Some(workflow) = pg_workflow? else {
        return Ok(());
    };
    let (_, board, _) = workflow.board().await?;
    let owner = caller(EMPLOYEE);
    workflow.tasks.create(&owner, draft(board.id(), "Report")?).await?;

    let result = workflow.tasks.create(&owner, draft(board.id(), "Report")?).await;

    assert!(matches!(
        result,
        Err(WorkflowError::Domain(WorkflowDomainError::Conflict(
            Conflict::TaskName(_)
        )))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_delete_trashes_assignments(
    pg_workflow: Result<Option<PgWorkflow>, BoxError>,
) -> Result<(), BoxError> {
    let Some(workflow) = pg_workflow? else {
        return Ok(());
    };
    let (_, board, _) = workflow.board().await?;
    let owner = caller(MANAGER);
    let task = workflow.tasks.create(&owner, draft(board.id(), "Report")?).await?;
    workflow.assignments.assign(&owner, task.id(), ASSIGNEE).await?;

    workflow.tasks.delete(&owner, task.id()).await?;
    let assignees = workflow.repository.list_assignees(task.id()).await?;
    let history = workflow.tasks.history(task.id()).await?;

    assert!(assignees.is_empty());
    let last = history.last().ok_or("history is empty")?;
    assert_eq!(last.action_type(), TaskActionType::Deleted);
    assert_eq!(last.comment(), Some("Task deleted"));
    Ok(())
}
