use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    response::IntoResponse,
};

use stockroom_auth::permissions;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{CompanyContext, PrincipalContext};

pub async fn list_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ScopeQuery>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::MOVEMENTS_READ) {
        return res;
    }
    let scope = match common::scope(&services, &principal, &query).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    match services
        .inventory
        .list_movements(principal.principal(), scope, query.limit)
        .await
    {
        Ok(list) => Json(dto::movements_to_json(&list)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ScopeQuery>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::ITEMS_READ) {
        return res;
    }
    let scope = match common::scope(&services, &principal, &query).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    match services.inventory.summary(principal.principal(), scope).await {
        Ok(summary) => Json(dto::summary_to_json(&summary)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn daily_reset(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::DAILY_RESET) {
        return res;
    }

    match services.inventory.daily_reset(principal.principal()).await {
        Ok(count) => Json(serde_json::json!({ "items_reset": count })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
