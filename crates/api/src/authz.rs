//! API-side authorization guard.
//!
//! Checked in each handler before the service is called, so the service and
//! store stay auth-agnostic.

use axum::http::StatusCode;
use axum::response::Response;

use stockroom_auth::{AuthzError, authorize};

use crate::app::errors;
use crate::context::{CompanyContext, PrincipalContext};

/// Check that the caller holds `permission` within the request's company.
pub fn require(
    company: &CompanyContext,
    principal: &PrincipalContext,
    permission: &str,
) -> Result<(), Response> {
    authorize(principal.principal(), company.company_id(), permission).map_err(|e| {
        tracing::warn!(
            user_id = %principal.user_id(),
            permission,
            error = %e,
            "request denied"
        );
        match e {
            AuthzError::CompanyMismatch => errors::json_error(StatusCode::FORBIDDEN, "company_mismatch", e.to_string()),
            AuthzError::Forbidden(_) => errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()),
        }
    })
}
