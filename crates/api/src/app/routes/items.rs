use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};

use stockroom_auth::permissions;
use stockroom_core::ItemId;

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{CompanyContext, PrincipalContext};

pub async fn list_items(
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

    match services
        .inventory
        .list_items(principal.principal(), scope, query.q.as_deref())
        .await
    {
        Ok(items) => Json(dto::items_to_json(&items)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ScopeQuery>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::ITEMS_WRITE) {
        return res;
    }
    let input = match body.into_new_item() {
        Ok(v) => v,
        Err(e) => return errors::bad_request(e),
    };
    let scope = match common::scope(&services, &principal, &query).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    match services.inventory.create_item(principal.principal(), scope, input).await {
        Ok(item) => (StatusCode::CREATED, Json(dto::item_to_json(&item))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::ITEMS_READ) {
        return res;
    }
    let item_id: ItemId = match common::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.inventory.item(principal.principal(), item_id).await {
        Ok(item) => Json(dto::item_to_json(&item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateItemRequest>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::ITEMS_WRITE) {
        return res;
    }
    let item_id: ItemId = match common::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let patch = match body.into_patch() {
        Ok(v) => v,
        Err(e) => return errors::bad_request(e),
    };

    match services
        .inventory
        .update_item(principal.principal(), item_id, patch)
        .await
    {
        Ok(item) => Json(dto::item_to_json(&item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::ITEMS_WRITE) {
        return res;
    }
    let item_id: ItemId = match common::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.inventory.delete_item(principal.principal(), item_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn item_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::MOVEMENTS_READ) {
        return res;
    }
    let item_id: ItemId = match common::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.inventory.item_movements(principal.principal(), item_id).await {
        Ok(list) => Json(dto::movements_to_json(&list)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn register_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::MovementBody>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::MOVEMENTS_WRITE) {
        return res;
    }
    let item_id: ItemId = match common::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let request = match body.into_request() {
        Ok(v) => v,
        Err(e) => return errors::bad_request(e),
    };

    match services
        .inventory
        .register_movement(principal.principal(), item_id, request)
        .await
    {
        Ok((item, movement)) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "item": dto::item_to_json(&item),
                "movement": dto::movement_to_json(&movement),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn usage(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ScopeQuery>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::MOVEMENTS_READ) {
        return res;
    }
    let (from, to) = match (
        dto::optional_date(query.from.as_deref()),
        dto::optional_date(query.to.as_deref()),
    ) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(e), _) | (_, Err(e)) => return errors::bad_request(e),
    };
    let scope = match common::scope(&services, &principal, &query).await {
        Ok(s) => s,
        Err(res) => return res,
    };

    match services
        .inventory
        .usage(principal.principal(), scope, from, to)
        .await
    {
        Ok(usage) => Json(dto::usage_to_json(&usage)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
