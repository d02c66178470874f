//! Management permission guard.

use super::error::{ForbiddenReason, WorkflowError, WorkflowResult};
use crate::workflow::{
    domain::{CallerContext, OrganizationId},
    ports::{DirectoryError, OrganizationDirectory},
};

/// Returns the caller's organization when their employee position allows
/// management operations.
pub(crate) async fn require_manager<D>(
    directory: &D,
    caller: &CallerContext,
) -> WorkflowResult<OrganizationId>
where
    D: OrganizationDirectory + ?Sized,
{
    let organization_id = require_organization(caller)?;
    let position = directory
        .employee_position(caller.account_id(), organization_id)
        .await
        .map_err(|err| match err {
            DirectoryError::NotFound(_) => WorkflowError::Forbidden(ForbiddenReason::NotAnEmployee),
            DirectoryError::Unavailable(_) => WorkflowError::Directory(err),
        })?;
    if position.can_manage() {
        Ok(organization_id)
    } else {
        tracing::debug!(
            account_id = %caller.account_id(),
            position = position.as_str(),
            "management operation refused"
        );
        Err(WorkflowError::Forbidden(
            ForbiddenReason::InsufficientPosition,
        ))
    }
}

/// Returns the caller's current organization.
pub(crate) fn require_organization(caller: &CallerContext) -> WorkflowResult<OrganizationId> {
    caller
        .organization_id()
        .ok_or(WorkflowError::Forbidden(ForbiddenReason::MissingOrganization))
}
