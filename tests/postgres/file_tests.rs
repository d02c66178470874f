//! Task file bookkeeping.

use crate::postgres::helpers::{BoxError, EMPLOYEE, PgWorkflow, caller, draft, pg_workflow};
use rstest::rstest;
use taskboard::workflow::{domain::TaskActionType, services::WorkflowError};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn files_are_attached_and_removed(
    pg_workflow: Result<Option<PgWorkflow>, BoxError>,
) -> Result<(), BoxError> {
    let Some(workflow) = pg_workflow? else {
        return Ok(());
    };
    let (_, board, _) = workflow.board().await?;
    let owner = caller(EMPLOYEE);
    let task = workflow.tasks.create(&owner, draft(board.id(), "Report")?).await?;

    let notes = workflow
        .files
        .upload(&owner, task.id(), "notes.txt", b"draft".to_vec())
        .await?;
    workflow
        .files
        .upload(&owner, task.id(), "chart.png", b"png".to_vec())
        .await?;
    workflow
        .files
        .delete_by_key(&owner, notes.key_name(), task.id())
        .await?;
    let remaining = workflow.files.list(task.id()).await?;
    let removed = workflow.files.delete_all(&owner, task.id()).await?;
    let missing = workflow
        .files
        .delete(&owner, notes.id(), task.id())
        .await;
    let history = workflow.tasks.history(task.id()).await?;

    assert_eq!(remaining.len(), 1);
    assert_eq!(removed, 1);
    assert!(!workflow.storage.contains(notes.key_name()));
    assert!(matches!(missing, Err(WorkflowError::NotFound(_))));
    assert_eq!(
        history.last().map(|action| action.action_type()),
        Some(TaskActionType::TaskAllFilesDeleted)
    );
    Ok(())
}
