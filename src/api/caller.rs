//! Caller identity forwarded by the gateway.

use super::error::ApiError;
use crate::workflow::domain::{AccountId, CallerContext, OrganizationId};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

/// Header carrying the authenticated account id.
pub const ACCOUNT_HEADER: &str = "x-account-id";
/// Header carrying the caller's current organization id.
pub const ORGANIZATION_HEADER: &str = "x-organization-id";
/// Header carrying the caller's platform role.
pub const ROLE_HEADER: &str = "x-role";

/// Extractor building a [`CallerContext`] from request headers.
#[derive(Debug, Clone)]
pub struct Caller(pub CallerContext);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = header(&parts.headers, ACCOUNT_HEADER)?
            .ok_or(ApiError::MissingCaller(ACCOUNT_HEADER))?
            .parse::<i64>()
            .map_err(|_| ApiError::InvalidHeader(ACCOUNT_HEADER))?;
        let mut caller = CallerContext::new(AccountId::new(account));

        if let Some(raw) = header(&parts.headers, ORGANIZATION_HEADER)? {
            let organization = raw
                .parse::<i64>()
                .map_err(|_| ApiError::InvalidHeader(ORGANIZATION_HEADER))?;
            caller = caller.with_organization(OrganizationId::new(organization));
        }
        if let Some(role) = header(&parts.headers, ROLE_HEADER)? {
            caller = caller.with_role(role);
        }
        Ok(Self(caller))
    }
}

/// Reads a header as trimmed text. Empty values count as absent.
pub(crate) fn header<'a>(
    headers: &'a HeaderMap,
    name: &'static str,
) -> Result<Option<&'a str>, ApiError> {
    headers
        .get(name)
        .map(|value| value.to_str().map_err(|_| ApiError::InvalidHeader(name)))
        .transpose()
        .map(|value| value.map(str::trim).filter(|text| !text.is_empty()))
}
