//! Public endpoints: first-run setup and login.

use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use stockroom_auth::{JwtClaims, UserAccount};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

fn issue_token(services: &AppServices, user: &UserAccount) -> Result<(String, JwtClaims), axum::response::Response> {
    services
        .jwt
        .issue(user.id, user.company_id, user.roles(), Utc::now())
        .map_err(|e| {
            tracing::error!(error = %e, "failed to issue token");
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", e.to_string())
        })
}

pub async fn setup(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SetupRequest>,
) -> axum::response::Response {
    let (company, user) = match services.inventory.setup(body.company, body.admin).await {
        Ok(v) => v,
        Err(e) => return errors::service_error_to_response(e),
    };
    let (token, claims) = match issue_token(&services, &user) {
        Ok(v) => v,
        Err(res) => return res,
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "company": company,
            "user": user,
            "token": token,
            "expires_at": claims.expires_at,
        })),
    )
        .into_response()
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let user = match services.inventory.login(&body.login, &body.password).await {
        Ok(user) => user,
        Err(e) => return errors::service_error_to_response(e),
    };
    let (token, claims) = match issue_token(&services, &user) {
        Ok(v) => v,
        Err(res) => return res,
    };

    Json(dto::LoginResponse {
        token,
        expires_at: claims.expires_at,
        user,
    })
    .into_response()
}
