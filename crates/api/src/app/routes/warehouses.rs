use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use stockroom_auth::permissions;
use stockroom_core::WarehouseId;
use stockroom_inventory::{NewWarehouse, WarehousePatch};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{CompanyContext, PrincipalContext};

pub async fn list_warehouses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::WAREHOUSES_READ) {
        return res;
    }

    match services.inventory.list_warehouses(principal.principal()).await {
        Ok(list) => Json(list).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<NewWarehouse>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::WAREHOUSES_WRITE) {
        return res;
    }

    match services.inventory.create_warehouse(principal.principal(), body).await {
        Ok(w) => (StatusCode::CREATED, Json(w)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<WarehousePatch>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::WAREHOUSES_WRITE) {
        return res;
    }
    let warehouse_id: WarehouseId = match common::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services
        .inventory
        .update_warehouse(principal.principal(), warehouse_id, body)
        .await
    {
        Ok(w) => Json(w).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::WAREHOUSES_WRITE) {
        return res;
    }
    let warehouse_id: WarehouseId = match common::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services
        .inventory
        .delete_warehouse(principal.principal(), warehouse_id)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn selected_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::WAREHOUSES_READ) {
        return res;
    }

    match services.inventory.selected_warehouse(principal.principal()).await {
        Ok(Some(w)) => Json(w).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "no_warehouse", "no warehouse exists yet"),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn select_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::SelectWarehouseRequest>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::WAREHOUSES_SELECT) {
        return res;
    }
    let warehouse_id: WarehouseId = match common::parse_id(&body.warehouse_id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services
        .inventory
        .select_warehouse(principal.principal(), warehouse_id)
        .await
    {
        Ok(w) => Json(w).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
