use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    response::IntoResponse,
};

use stockroom_auth::permissions;
use stockroom_inventory::CompanyPatch;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::{CompanyContext, PrincipalContext};

pub async fn get_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::COMPANY_READ) {
        return res;
    }

    match services.inventory.company(principal.principal()).await {
        Ok(c) => Json(c).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CompanyPatch>,
) -> axum::response::Response {
    if let Err(res) = authz::require(&company, &principal, permissions::COMPANY_WRITE) {
        return res;
    }

    match services.inventory.update_company(principal.principal(), body).await {
        Ok(c) => Json(c).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
