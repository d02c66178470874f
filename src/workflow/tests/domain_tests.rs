//! Domain validation and value behaviour.

use super::fixtures::due_date;
use crate::workflow::{
    domain::{
        AccountId, BoardId, Conflict, EntityRef, ErrorKind, MoveDirection, NewTask, Priority,
        ReorderDirection, StatePosition, StateTransition, Task, TaskActionType, TaskChanges, TaskState,
        WorkflowDomainError,
    },
    services::{ForbiddenReason, WorkflowError},
};
use chrono::Utc;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn board_id() -> BoardId {
    BoardId::new()
}

fn state(board_id: BoardId, code: &str, position: u32) -> TaskState {
    TaskState::new(
        board_id,
        &TaskState::default_name_for(code),
        code,
        StatePosition::following(position.saturating_sub(1)),
        Utc::now(),
    )
    .expect("valid state")
}

fn task(board_id: BoardId, initial: &TaskState) -> Task {
    let input = NewTask {
        board_id,
        name: "Quarterly report".to_owned(),
        description: "Collect the numbers".to_owned(),
        due_date: due_date(),
        priority: Priority::new(2).expect("valid priority"),
        owner_id: AccountId::new(7),
    };
    Task::new(&input, initial, &DefaultClock).expect("valid task")
}

#[rstest]
#[case(0, false)]
#[case(1, true)]
#[case(5, true)]
#[case(6, false)]
fn priority_accepts_one_to_five(#[case] raw: i32, #[case] valid: bool) {
    assert_eq!(Priority::new(raw).is_ok(), valid);
}

#[rstest]
fn priority_deserializes_with_validation() {
    let accepted: Result<Priority, _> = serde_json::from_str("4");
    let rejected: Result<Priority, _> = serde_json::from_str("9");

    assert_eq!(accepted.ok().map(Priority::value), Some(4));
    assert!(rejected.is_err());
}

#[rstest]
#[case("forward", MoveDirection::Forward)]
#[case(" BACKWARD ", MoveDirection::Backward)]
fn move_direction_parses_case_insensitively(#[case] raw: &str, #[case] expected: MoveDirection) {
    assert_eq!(MoveDirection::try_from(raw), Ok(expected));
}

#[rstest]
fn directions_use_screaming_case_on_the_wire() {
    let reorder: ReorderDirection =
        serde_json::from_str("\"DOWN\"").expect("direction should parse");
    let encoded = serde_json::to_string(&MoveDirection::Backward).expect("serialize direction");

    assert_eq!(reorder, ReorderDirection::Down);
    assert_eq!(encoded, "\"BACKWARD\"");
}

#[rstest]
fn task_starts_in_initial_state(board_id: BoardId) {
    let initial = state(board_id, "NEW", 1);

    let created = task(board_id, &initial);

    assert_eq!(created.state_id(), initial.id());
    assert!(created.is_owned_by(AccountId::new(7)));
    assert!(!created.is_deleted());
}

#[rstest]
fn task_rejects_state_of_another_board(board_id: BoardId) {
    let initial = state(board_id, "NEW", 1);
    let foreign = state(BoardId::new(), "DONE", 4);
    let mut created = task(board_id, &initial);

    let transition = StateTransition {
        from: initial.clone(),
        to: foreign.clone(),
        action_type: TaskActionType::MovedForward,
    };

    let result = created.apply_transition(&transition, AccountId::new(7), Utc::now());

    assert_eq!(
        result.err(),
        Some(WorkflowDomainError::StateOnAnotherBoard {
            state_id: foreign.id(),
            board_id,
        })
    );
    assert_eq!(created.state_id(), initial.id());
}

#[rstest]
fn apply_changes_reports_only_changed_fields(board_id: BoardId) {
    let initial = state(board_id, "NEW", 1);
    let mut created = task(board_id, &initial);
    let changes = TaskChanges {
        name: Some("Quarterly report".to_owned()),
        description: Some("Collect and chart the numbers".to_owned()),
        due_date: None,
        priority: Some(Priority::new(5).expect("valid priority")),
    };

    let diff = created
        .apply_changes(&changes, &DefaultClock)
        .expect("changes should apply");

    let audit: Vec<(String, String)> = diff
        .iter()
        .map(|change| (change.old_value(), change.new_value()))
        .collect();
    assert_eq!(
        audit,
        [
            (
                "description:Collect the numbers".to_owned(),
                "description:Collect and chart the numbers".to_owned()
            ),
            ("priority:2".to_owned(), "priority:5".to_owned()),
        ]
    );
    assert_eq!(created.priority().value(), 5);
}

#[rstest]
fn apply_changes_leaves_task_untouched_on_invalid_name(board_id: BoardId) {
    let initial = state(board_id, "NEW", 1);
    let mut created = task(board_id, &initial);
    let before = created.clone();
    let changes = TaskChanges {
        name: Some("   ".to_owned()),
        description: Some("Other".to_owned()),
        ..TaskChanges::default()
    };

    let result = created.apply_changes(&changes, &DefaultClock);

    assert!(matches!(result, Err(WorkflowDomainError::EmptyValue(_))));
    assert_eq!(created, before);
}

#[rstest]
fn action_types_use_stable_codes() {
    assert_eq!(TaskActionType::MovedForward.as_str(), "MOVED_FORWARD");
    assert_eq!(
        TaskActionType::TaskAllFilesDeleted.as_str(),
        "TASK_ALL_FILES_DELETED"
    );
}

#[rstest]
#[case::conflict(
    WorkflowError::from(WorkflowDomainError::from(Conflict::TaskName("a".to_owned()))),
    ErrorKind::Conflict,
    "TASK_ALREADY_EXISTS"
)]
#[case::not_found(
    WorkflowError::NotFound(EntityRef::Board(BoardId::new())),
    ErrorKind::NotFound,
    "BOARD_NOT_FOUND"
)]
#[case::forbidden(
    WorkflowError::Forbidden(ForbiddenReason::NotOwnerOrAssignee),
    ErrorKind::Forbidden,
    "NOT_OWNER_OR_ASSIGNEE"
)]
#[case::bad_request(
    WorkflowError::from(WorkflowDomainError::InvalidPriority(9)),
    ErrorKind::BadRequest,
    "INVALID_PRIORITY"
)]
fn errors_expose_kind_and_code(
    #[case] error: WorkflowError,
    #[case] kind: ErrorKind,
    #[case] code: &str,
) {
    assert_eq!(error.kind(), kind);
    assert_eq!(error.code(), code);
}
