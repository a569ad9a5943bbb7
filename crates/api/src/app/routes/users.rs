use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use stockroom_auth::{NewUser, permissions};
use stockroom_core::UserId;

use crate::app::errors;
use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::{CompanyContext, PrincipalContext};

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::USERS_MANAGE) {
        return res;
    }

    match services.inventory.list_users(principal.principal()).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<NewUser>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::USERS_MANAGE) {
        return res;
    }

    match services.inventory.create_user(principal.principal(), body).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::USERS_MANAGE) {
        return res;
    }
    let user_id: UserId = match common::parse_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.inventory.delete_user(principal.principal(), user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
