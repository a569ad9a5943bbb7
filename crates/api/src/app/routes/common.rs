use core::str::FromStr;

use axum::response::Response;

use stockroom_core::DomainError;
use stockroom_inventory::WarehouseScope;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

/// Parse a path id, answering 400 on garbage.
pub fn parse_id<T>(raw: &str) -> Result<T, Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse().map_err(errors::bad_request)
}

/// Scope of a read or write: the `warehouse` query parameter when given,
/// otherwise the caller's selected warehouse.
pub async fn scope(
    services: &AppServices,
    principal: &PrincipalContext,
    query: &dto::ScopeQuery,
) -> Result<WarehouseScope, Response> {
    let requested = query.scope().map_err(errors::bad_request)?;
    services
        .inventory
        .resolve_scope(principal.principal(), requested)
        .await
        .map_err(errors::service_error_to_response)
}
