use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::{CompanyContext, PrincipalContext};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(company): Extension<CompanyContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let user = match services.inventory.current_user(principal.principal()).await {
        Ok(user) => Some(user),
        Err(stockroom_infra::ServiceError::NotFound) => None,
        Err(e) => return errors::service_error_to_response(e),
    };

    Json(serde_json::json!({
        "company_id": company.company_id().to_string(),
        "user_id": principal.user_id().to_string(),
        "roles": principal.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
        "permissions": principal
            .principal()
            .permissions
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>(),
        "user": user,
    }))
    .into_response()
}
