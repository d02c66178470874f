//! Authenticated caller and organization roles.

use super::{AccountId, OrganizationId};
use serde::{Deserialize, Serialize};

/// Principal on whose behalf a workflow operation runs.
///
/// The gateway validates the token and forwards these values; this crate
/// trusts them as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    account_id: AccountId,
    organization_id: Option<OrganizationId>,
    role: Option<String>,
}

impl CallerContext {
    /// Creates a context for an account without a current organization.
    #[must_use]
    pub const fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            organization_id: None,
            role: None,
        }
    }

    /// Sets the caller's current organization.
    #[must_use]
    pub const fn with_organization(mut self, organization_id: OrganizationId) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    /// Sets the caller's platform role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Returns the calling account.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Returns the current organization, if any.
    #[must_use]
    pub const fn organization_id(&self) -> Option<OrganizationId> {
        self.organization_id
    }

    /// Returns the platform role, if any.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}

/// Position of an employee within an organization.
///
/// ```
/// use taskboard::workflow::domain::EmployeePosition;
///
/// assert!(!EmployeePosition::new("ORG_EMPLOYEE").can_manage());
/// assert!(EmployeePosition::new("ORG_ADMIN").can_manage());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeePosition(String);

impl EmployeePosition {
    /// Position that may not change projects, boards, states or assignments.
    pub const REGULAR_EMPLOYEE: &'static str = "ORG_EMPLOYEE";

    /// Wraps a position label as reported by the organization directory.
    #[must_use]
    pub fn new(position: impl Into<String>) -> Self {
        Self(position.into())
    }

    /// Returns the position label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the position grants management permission.
    #[must_use]
    pub fn can_manage(&self) -> bool {
        self.0 != Self::REGULAR_EMPLOYEE
    }
}
