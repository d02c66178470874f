//! Text field limits shared by workflow entities.

use super::WorkflowDomainError;

/// Maximum length of a project name.
pub const PROJECT_NAME_MAX: usize = 124;
/// Maximum length of a board name.
pub const BOARD_NAME_MAX: usize = 72;
/// Maximum length of a board title.
pub const BOARD_TITLE_MAX: usize = 124;
/// Maximum length of a task state name.
pub const STATE_NAME_MAX: usize = 72;
/// Maximum length of a task state code.
pub const STATE_CODE_MAX: usize = 60;
/// Maximum length of a task name.
pub const TASK_NAME_MAX: usize = 150;
/// Maximum length of a task description.
pub const TASK_DESCRIPTION_MAX: usize = 2000;

/// Trims `value` and checks it is non-empty and within `max` characters.
pub(crate) fn required_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, WorkflowDomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorkflowDomainError::EmptyValue(field));
    }
    bounded_text(field, trimmed, max)
}

/// Checks that `value` fits within `max` characters, keeping it verbatim.
pub(crate) fn bounded_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, WorkflowDomainError> {
    if value.chars().count() > max {
        return Err(WorkflowDomainError::ValueTooLong { field, max });
    }
    Ok(value.to_owned())
}
